//! Domain layer for consilium
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Consultation
//!
//! A panel of [`Agent`]s discusses a [`Case`] in rounds. After each round
//! every active agent names the least accurate contributor; a unique
//! maximum is eliminated. The consultation ends when one agent remains or
//! too many rounds pass without an elimination.
//!
//! ## Knowledge
//!
//! Reference documents are chunked and embedded, then ranked against a
//! query by a weighted mix of lexical overlap and cosine similarity.

pub mod agent;
pub mod case;
pub mod core;
pub mod discussion;
pub mod knowledge;
pub mod prompt;
pub mod summary;
pub mod voting;

// Re-export commonly used types
pub use agent::entities::{Agent, AgentStatus, Provider, ProviderConfig};
pub use case::entities::{Case, FindingStatus, ImageFinding, LinkedCase};
pub use core::{
    error::DomainError,
    validation::{ConfigIssue, ConfigIssueCode, Severity},
};
pub use discussion::{
    history::{DiscussionHistory, Entry},
    settings::ConsultationSettings,
    turn_order::TurnOrder,
    workflow::{FinishReason, Phase, Progress, WorkflowState, check_end_conditions},
};
pub use knowledge::{
    config::{EmbeddingConfig, RetrievalConfig},
    entities::{Chunk, DocumentPatch, KnowledgeDocument, RawDocument, RetrievedEntry},
};
pub use prompt::{PromptBundle, PromptContext, PromptTemplate, ProviderMessage, Role};
pub use summary::entities::{FinalSummary, SummaryStatus};
pub use voting::{
    parsing::{VoteDecision, parse_vote},
    record::VoteRecord,
    tally::TallyOutcome,
};
