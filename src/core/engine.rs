use crate::core::dtmi::is_valid_dtmi;
use crate::core::parser::ModelParser;
use crate::core::projection::{extract_commands, extract_telemetry};
use crate::domain::model::{DeviceData, EntityGraph, ModelDescription};
use crate::domain::ports::{DeviceRegistry, DtmiResolver};
use crate::utils::error::{ResolveError, Result};

/// Top-level resolution engine: root fetch, fixed-point parse, projection.
/// Stateless across calls; one instance can serve concurrent resolutions.
pub struct ModelResolver<R: DtmiResolver> {
    repository: R,
    parser: ModelParser,
}

impl<R: DtmiResolver> ModelResolver<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository,
            parser: ModelParser::new(),
        }
    }

    pub fn with_parser(repository: R, parser: ModelParser) -> Self {
        Self { repository, parser }
    }

    /// Resolves a root identifier into a fully-linked entity graph. The
    /// caller gets a complete graph or one explicit error, never a partial
    /// result.
    pub async fn resolve(&self, dtmi: &str) -> Result<EntityGraph> {
        tracing::info!("resolving model {}", dtmi);

        let documents = self.repository.resolve(&[dtmi.to_string()]).await;
        let root = documents.into_iter().next().unwrap_or_default();
        if root.trim().is_empty() {
            return Err(ResolveError::UnresolvedReference {
                dtmi: dtmi.to_string(),
            });
        }

        self.parser.parse(&[root], &self.repository).await
    }

    /// Resolves a model and projects it into telemetry and command records.
    pub async fn describe(&self, dtmi: &str) -> Result<ModelDescription> {
        let graph = self.resolve(dtmi).await?;
        Ok(ModelDescription {
            model_id: dtmi.to_string(),
            telemetry: extract_telemetry(&graph),
            commands: extract_commands(&graph),
        })
    }

    /// Looks a device up in the registry and, when its twin advertises a
    /// model, attaches the model's telemetry and command descriptions. A twin
    /// without a model id, or with an invalid one, yields empty lists; parse
    /// failures propagate so callers can tell a missing model apart from a
    /// broken one.
    pub async fn device_overview(
        &self,
        registry: &dyn DeviceRegistry,
        device_id: &str,
    ) -> Result<DeviceData> {
        let device = registry.get_device(device_id).await?.ok_or_else(|| {
            ResolveError::DeviceNotFound {
                device_id: device_id.to_string(),
            }
        })?;
        let twin = registry.get_twin(device_id).await?;

        let mut data = DeviceData {
            device_id: device.id,
            connection_state: device.connection_state,
            status: device.status,
            authentication_type: device.authentication_type,
            primary_key: device.primary_key,
            secondary_key: device.secondary_key,
            model_id: None,
            telemetry: Vec::new(),
            commands: Vec::new(),
        };

        if let Some(model_id) = twin.and_then(|twin| twin.model_id) {
            if is_valid_dtmi(&model_id) {
                let description = self.describe(&model_id).await?;
                data.telemetry = description.telemetry;
                data.commands = description.commands;
                data.model_id = Some(model_id);
            } else {
                tracing::warn!(
                    "device {} twin advertises invalid model id {:?}, skipping",
                    device_id,
                    model_id
                );
            }
        }

        Ok(data)
    }
}
