use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("malformed model document: {0}")]
    MalformedDocument(#[from] serde_json::Error),

    #[error("invalid model content: {message}")]
    InvalidModel { message: String },

    #[error("unresolved model reference: {dtmi}")]
    UnresolvedReference { dtmi: String },

    #[error("duplicate entity identifier: {dtmi}")]
    DuplicateEntity { dtmi: String },

    #[error("reference {dtmi} does not resolve to a {expected}")]
    IncompatibleReference { dtmi: String, expected: &'static str },

    #[error("model resolution exceeded depth cap of {cap}")]
    DepthCapExceeded { cap: usize },

    #[error("model resolution cancelled")]
    Cancelled,

    #[error("device not found: {device_id}")]
    DeviceNotFound { device_id: String },

    #[error("registry error: {message}")]
    RegistryError { message: String },

    #[error("invalid config value for {field}: {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("config validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },
}

pub type Result<T> = std::result::Result<T, ResolveError>;
