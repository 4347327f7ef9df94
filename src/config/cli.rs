use crate::core::dtmi::is_valid_dtmi;
use crate::domain::ports::RepositorySettings;
use crate::utils::error::{ResolveError, Result};
use crate::utils::validation::{validate_positive_number, validate_url, Validate};
use clap::Parser;
use std::time::Duration;

#[derive(Debug, Clone, Parser)]
#[command(name = "twin-resolver")]
#[command(about = "Resolve a digital twin model and print its telemetry and commands")]
pub struct CliConfig {
    /// Model identifier to resolve, e.g. dtmi:com:example:Thermostat;1
    pub dtmi: String,

    #[arg(long, default_value = "https://devicemodels.azure.com")]
    pub endpoint: String,

    /// Repository access token, sent as `Authorization: token <value>`
    #[arg(long)]
    pub token: Option<String>,

    #[arg(long, default_value = "8")]
    pub max_depth: usize,

    /// Per-request HTTP timeout
    #[arg(long, default_value = "30")]
    pub timeout_seconds: u64,

    /// Overall resolution deadline; unset means no deadline
    #[arg(long)]
    pub resolution_timeout_seconds: Option<u64>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_url("endpoint", &self.endpoint)?;
        validate_positive_number("max_depth", self.max_depth, 1)?;
        validate_positive_number("timeout_seconds", self.timeout_seconds as usize, 1)?;
        if !is_valid_dtmi(&self.dtmi) {
            return Err(ResolveError::InvalidConfigValueError {
                field: "dtmi".to_string(),
                value: self.dtmi.clone(),
                reason: "not a valid DTMI".to_string(),
            });
        }
        Ok(())
    }
}

impl RepositorySettings for CliConfig {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn auth_token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    fn max_depth(&self) -> usize {
        self.max_depth
    }
}
