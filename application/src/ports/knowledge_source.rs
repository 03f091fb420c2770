//! Knowledge source port
//!
//! What the consultation engine needs from the knowledge base: ranked
//! context for a query.

use crate::ports::agent_gateway::GatewayError;
use crate::ports::kv_store::StoreError;
use async_trait::async_trait;
use consilium_domain::RetrievedEntry;
use thiserror::Error;

/// Errors from knowledge base operations
#[derive(Error, Debug)]
pub enum KnowledgeError {
    #[error("document not found: {0}")]
    NotFound(String),

    #[error("import failed: malformed or invalid content ({0})")]
    Import(String),

    #[error("embedding failed: {0}")]
    Embedding(#[from] GatewayError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// A retrieval request. Unset parameters fall back to the stored retrieval
/// configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RetrievalQuery {
    pub text: String,
    /// Restrict candidates to these documents when non-empty
    pub selected_doc_ids: Vec<String>,
    pub top_k: Option<f64>,
    pub keyword_weight: Option<f64>,
}

impl RetrievalQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_selected(mut self, ids: Vec<String>) -> Self {
        self.selected_doc_ids = ids;
        self
    }

    pub fn with_top_k(mut self, top_k: f64) -> Self {
        self.top_k = Some(top_k);
        self
    }

    pub fn with_keyword_weight(mut self, weight: f64) -> Self {
        self.keyword_weight = Some(weight);
        self
    }
}

#[async_trait]
pub trait KnowledgeSource: Send + Sync {
    async fn retrieve_context(&self, query: RetrievalQuery) -> Result<Vec<RetrievedEntry>, KnowledgeError>;
}

/// Source with no documents
pub struct NoKnowledge;

#[async_trait]
impl KnowledgeSource for NoKnowledge {
    async fn retrieve_context(&self, _query: RetrievalQuery) -> Result<Vec<RetrievedEntry>, KnowledgeError> {
        Ok(Vec::new())
    }
}
