//! Infrastructure layer for consilium
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod logging;
pub mod providers;
pub mod storage;

// Re-export commonly used types
pub use config::{
    ConfigError, ConfigLoader, FileAgentConfig, FileConfig, FileConsultationConfig,
    FileLoggingConfig, FileStorageConfig,
};
pub use logging::JsonlConversationLogger;
pub use providers::{HttpAgentGateway, ModelInfo, ModelScopeEmbedder, ProviderError};
pub use storage::JsonFileStore;
