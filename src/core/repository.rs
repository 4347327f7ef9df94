use crate::core::dtmi::dtmi_to_path;
use crate::domain::ports::{DtmiResolver, RepositorySettings};
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use std::time::Duration;

/// HTTP client for a convention-based model repository. Endpoint and token
/// are fixed at construction; one instance serves many resolutions.
pub struct ModelRepositoryClient {
    client: Client,
    endpoint: String,
    auth_token: Option<String>,
}

impl ModelRepositoryClient {
    pub fn new(
        endpoint: impl Into<String>,
        auth_token: Option<String>,
        request_timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().timeout(request_timeout).build()?;
        let endpoint = endpoint.into().trim_end_matches('/').to_string();
        Ok(Self {
            client,
            endpoint,
            auth_token,
        })
    }

    pub fn from_settings<C: RepositorySettings>(settings: &C) -> Result<Self> {
        Self::new(
            settings.endpoint(),
            settings.auth_token().map(str::to_string),
            settings.request_timeout(),
        )
    }

    /// Fetches one document by repository-relative path. A missing dependency
    /// is an expected condition in a best-effort resolution graph, so every
    /// transport or status failure degrades to an empty document and is only
    /// logged.
    pub async fn fetch(&self, path: &str) -> String {
        let url = format!("{}{}", self.endpoint, path);
        tracing::debug!("fetching model document from {}", url);

        let mut request = self.client.get(&url);
        if let Some(token) = &self.auth_token {
            request = request.header(AUTHORIZATION, format!("token {}", token));
        }

        match request.send().await {
            Ok(response) if response.status().is_success() => {
                response.text().await.unwrap_or_else(|e| {
                    tracing::warn!("failed to read model document body from {}: {}", url, e);
                    String::new()
                })
            }
            Ok(response) => {
                tracing::warn!(
                    "model document not found at {} (status {})",
                    url,
                    response.status()
                );
                String::new()
            }
            Err(e) => {
                tracing::warn!("model document request to {} failed: {}", url, e);
                String::new()
            }
        }
    }
}

#[async_trait]
impl DtmiResolver for ModelRepositoryClient {
    async fn resolve(&self, dtmis: &[String]) -> Vec<String> {
        let mut documents = Vec::with_capacity(dtmis.len());
        for dtmi in dtmis {
            if dtmi.trim().is_empty() {
                documents.push(String::new());
                continue;
            }
            tracing::debug!("resolver looking for {}", dtmi);
            match dtmi_to_path(dtmi) {
                Some(path) => documents.push(self.fetch(&path).await),
                None => {
                    tracing::warn!("invalid DTMI: {}", dtmi);
                    documents.push(String::new());
                }
            }
        }
        documents
    }
}
