//! ModelScope / DashScope embedding client implementing [`Embedder`].

use super::endpoints::embedding_roots;
use super::error::ProviderError;
use super::gateway::{DEFAULT_HTTP_TIMEOUT, MAX_ERROR_BODY};
use super::wire::{EmbeddingRequest, EmbeddingResponse};
use async_trait::async_trait;
use consilium_application::{Embedder, GatewayError};
use consilium_domain::EmbeddingConfig;
use consilium_domain::core::string::truncate;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

pub struct ModelScopeEmbedder {
    client: Client,
}

impl ModelScopeEmbedder {
    pub fn new() -> Result<Self, ProviderError> {
        Self::with_timeout(DEFAULT_HTTP_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Client(e.to_string()))?;
        Ok(Self { client })
    }

    async fn post(&self, root: &str, api_key: &str, body: &EmbeddingRequest<'_>) -> Result<Vec<f32>, ProviderError> {
        let response = self
            .client
            .post(format!("{}/embeddings", root))
            .bearer_auth(api_key)
            .json(body)
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(ProviderError::Http {
                status: status.as_u16(),
                body: truncate(&text, MAX_ERROR_BODY),
            });
        }
        let parsed: EmbeddingResponse =
            serde_json::from_str(&text).map_err(|e| ProviderError::Decode(e.to_string()))?;
        Ok(parsed.into_vector())
    }

    async fn embed_text(&self, config: &EmbeddingConfig, text: &str) -> Result<Vec<f32>, ProviderError> {
        let api_key = config.api_key.trim();
        if api_key.is_empty() {
            return Err(ProviderError::Missing("embedding api key"));
        }
        let model = config.model.trim();
        if model.is_empty() {
            return Err(ProviderError::Missing("embedding model"));
        }
        if text.trim().is_empty() {
            return Err(ProviderError::Missing("text to embed"));
        }

        let body = EmbeddingRequest {
            model,
            input: text,
            encoding_format: "float",
        };
        let base_url = Some(config.base_url.as_str());
        let mut failures = Vec::new();
        for root in embedding_roots(api_key, base_url) {
            match self.post(&root, api_key, &body).await {
                Ok(vector) => {
                    debug!("Embedded {} chars into {} dims via {}", text.chars().count(), vector.len(), root);
                    return Ok(vector);
                }
                Err(e) => failures.push(e.at(&root)),
            }
        }
        Err(ProviderError::AllEndpointsFailed(failures))
    }
}

#[async_trait]
impl Embedder for ModelScopeEmbedder {
    async fn embed(&self, config: &EmbeddingConfig, text: &str) -> Result<Vec<f32>, GatewayError> {
        self.embed_text(config, text).await.map_err(GatewayError::from)
    }
}
