//! Application layer for consilium
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::ExecutionParams;
pub use ports::{
    agent_gateway::{AgentGateway, Embedder, GatewayError},
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    knowledge_source::{KnowledgeError, KnowledgeSource, NoKnowledge, RetrievalQuery},
    kv_store::{InMemoryStore, KeyValueStore, StoreError},
    progress::{DiscussionObserver, NoProgress},
};
pub use use_cases::final_summary::{FinalSummaryProducer, SummaryRequest};
pub use use_cases::knowledge_base::{ImportSummary, IngestRequest, KnowledgeBase};
pub use use_cases::run_consultation::{
    ConsultError, ConsultationEngine, ConsultationOutcome, PauseHandle,
};
