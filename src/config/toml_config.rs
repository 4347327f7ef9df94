use crate::domain::ports::RepositorySettings;
use crate::utils::error::{ResolveError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
const DEFAULT_MAX_DEPTH: usize = 8;

/// File-based configuration for embedding the resolver in a service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub repository: RepositoryConfig,
    pub resolution: Option<ResolutionConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryConfig {
    pub endpoint: String,
    pub token: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolutionConfig {
    pub max_depth: Option<usize>,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ResolveError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| ResolveError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR_NAME}` placeholders with environment values; unset
    /// variables keep the placeholder text.
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").expect("placeholder pattern is a valid regex");

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .to_string()
    }

    pub fn validate_config(&self) -> Result<()> {
        crate::utils::validation::validate_url("repository.endpoint", &self.repository.endpoint)?;

        if let Some(max_depth) = self.resolution.as_ref().and_then(|r| r.max_depth) {
            crate::utils::validation::validate_positive_number(
                "resolution.max_depth",
                max_depth,
                1,
            )?;
        }

        Ok(())
    }
}

impl RepositorySettings for TomlConfig {
    fn endpoint(&self) -> &str {
        &self.repository.endpoint
    }

    fn auth_token(&self) -> Option<&str> {
        self.repository.token.as_deref()
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.repository
                .timeout_seconds
                .unwrap_or(DEFAULT_TIMEOUT_SECONDS),
        )
    }

    fn max_depth(&self) -> usize {
        self.resolution
            .as_ref()
            .and_then(|r| r.max_depth)
            .unwrap_or(DEFAULT_MAX_DEPTH)
    }
}
