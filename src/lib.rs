pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;
pub use crate::config::TomlConfig;

pub use crate::core::engine::ModelResolver;
pub use crate::core::parser::ModelParser;
pub use crate::core::repository::ModelRepositoryClient;
pub use crate::domain::model::{CommandRecord, DeviceData, ModelDescription, TelemetryRecord};
pub use crate::domain::ports::{DeviceRegistry, DtmiResolver, RepositorySettings};
pub use crate::utils::error::{ResolveError, Result};
