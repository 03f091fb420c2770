//! Provider adapters
//!
//! - [`HttpAgentGateway`]: chat calls for OpenAI, Anthropic, Gemini, SiliconFlow and ModelScope
//! - [`ModelScopeEmbedder`]: embeddings via ModelScope or DashScope
//!
//! Provider JSON stays inside this module; callers only see text, vectors and
//! [`GatewayError`](consilium_application::GatewayError).

pub mod endpoints;
pub mod error;
pub mod wire;

mod embedder;
mod gateway;

pub use embedder::ModelScopeEmbedder;
pub use error::{EndpointFailure, ProviderError};
pub use gateway::{HttpAgentGateway, ModelInfo, SIMULATED_DELAY, simulated_reply};
