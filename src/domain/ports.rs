use crate::domain::model::{Device, Twin};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// The callback the model parser uses to pull in referenced-but-unparsed
/// model documents. Implementations must preserve order (output N belongs to
/// input N), return one string per input, and never fail: a document that
/// cannot be fetched degrades to an empty string.
#[async_trait]
pub trait DtmiResolver: Send + Sync {
    async fn resolve(&self, dtmis: &[String]) -> Vec<String>;
}

/// External device registry / twin store. Out of scope for this crate;
/// specified here so the resolution engine can consume it.
#[async_trait]
pub trait DeviceRegistry: Send + Sync {
    async fn get_device(&self, device_id: &str) -> Result<Option<Device>>;
    async fn get_twin(&self, device_id: &str) -> Result<Option<Twin>>;
}

pub trait RepositorySettings: Send + Sync {
    fn endpoint(&self) -> &str;
    fn auth_token(&self) -> Option<&str>;
    fn request_timeout(&self) -> Duration;
    fn max_depth(&self) -> usize;
}
