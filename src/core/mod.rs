pub mod dtmi;
pub mod engine;
pub mod parser;
pub mod projection;
pub mod repository;

pub use crate::domain::model::{
    CommandRecord, DeviceData, Entity, EntityGraph, ModelDescription, TelemetryRecord,
};
pub use crate::domain::ports::{DeviceRegistry, DtmiResolver, RepositorySettings};
pub use crate::utils::error::Result;
