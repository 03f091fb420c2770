//! Agent gateway port
//!
//! Defines the interface for calling language-model and embedding providers.

use async_trait::async_trait;
use consilium_domain::{Agent, EmbeddingConfig, PromptBundle, ProviderMessage};
use thiserror::Error;

/// Errors that can occur during gateway operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("provider returned {status}: {body}")]
    Provider { status: u16, body: String },

    #[error("request timed out, check the model configuration or network")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),

    #[error("unsupported: {0}")]
    Unsupported(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("cancelled")]
    Cancelled,
}

/// Gateway for agent calls
///
/// Implementations normalize every provider's response shape to plain text.
/// They live in the infrastructure layer.
#[async_trait]
pub trait AgentGateway: Send + Sync {
    /// Generate a reply for `agent` given a prompt and the prior conversation
    async fn generate(
        &self,
        agent: &Agent,
        prompt: &PromptBundle,
        history: &[ProviderMessage],
    ) -> Result<String, GatewayError>;
}

/// Text embedding client
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, config: &EmbeddingConfig, text: &str) -> Result<Vec<f32>, GatewayError>;
}
