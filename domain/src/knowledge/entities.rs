//! Knowledge base entities
//!
//! Documents and chunks are stored as camelCase JSON so exports stay
//! interchangeable with previously exported knowledge bases.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Title given to documents imported without one
pub const UNTITLED_DOCUMENT: &str = "Untitled document";

/// Collection key used when a document has no collection id
pub const DEFAULT_COLLECTION: &str = "default";

/// Generate an id of the form `{prefix}-{millis}-{hex6}`
pub fn generate_id(prefix: &str) -> String {
    let suffix: u32 = rand::thread_rng().gen_range(0..0x0100_0000);
    format!("{}-{}-{:06x}", prefix, Utc::now().timestamp_millis(), suffix)
}

/// A stored reference document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeDocument {
    pub id: String,
    pub title: String,
    pub tags: Vec<String>,
    pub collection_id: String,
    pub content: String,
    pub excerpt: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl KnowledgeDocument {
    /// Text used when the document stands in for retrieved chunks
    pub fn excerpt_or_content(&self) -> &str {
        if self.excerpt.is_empty() {
            &self.content
        } else {
            &self.excerpt
        }
    }

    pub fn collection_key(&self) -> &str {
        if self.collection_id.is_empty() {
            DEFAULT_COLLECTION
        } else {
            &self.collection_id
        }
    }

    /// Key used to detect duplicates on import
    pub fn dedupe_key(&self) -> String {
        format!("{}::{}", self.title, self.content)
    }

    /// Whether the document matches a lower-cased query and carries every tag
    pub fn matches(&self, query: &str, tags: &[String]) -> bool {
        if !tags.iter().all(|t| self.tags.contains(t)) {
            return false;
        }
        let q = query.trim().to_lowercase();
        if q.is_empty() {
            return true;
        }
        self.title.to_lowercase().contains(&q)
            || self.content.to_lowercase().contains(&q)
            || self.tags.iter().any(|t| t.to_lowercase().contains(&q))
    }

    pub fn apply(&mut self, patch: DocumentPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(tags) = patch.tags {
            self.tags = tags.into_iter().filter(|t| !t.is_empty()).collect();
        }
        if let Some(collection_id) = patch.collection_id {
            self.collection_id = collection_id;
        }
        if let Some(content) = patch.content {
            self.content = content;
        }
        if let Some(excerpt) = patch.excerpt {
            self.excerpt = excerpt;
        }
        self.updated_at = Utc::now();
    }
}

/// Loosely-typed document as found in storage or import payloads.
///
/// Every field is optional; [`RawDocument::normalize`] fills the gaps.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawDocument {
    pub id: Option<String>,
    pub title: Option<String>,
    pub tags: Option<Vec<Option<String>>>,
    pub collection_id: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl RawDocument {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            content: Some(content.into()),
            ..Default::default()
        }
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = Some(tags.into_iter().map(Some).collect());
        self
    }

    pub fn with_collection(mut self, collection_id: impl Into<String>) -> Self {
        self.collection_id = Some(collection_id.into());
        self
    }

    pub fn normalize(self) -> KnowledgeDocument {
        let now = Utc::now();
        KnowledgeDocument {
            id: self
                .id
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| generate_id("kb")),
            title: self.title.unwrap_or_else(|| UNTITLED_DOCUMENT.to_string()),
            tags: self
                .tags
                .unwrap_or_default()
                .into_iter()
                .flatten()
                .filter(|t| !t.is_empty())
                .collect(),
            collection_id: self.collection_id.unwrap_or_default(),
            content: self.content.unwrap_or_default(),
            excerpt: self.excerpt.unwrap_or_default(),
            created_at: self.created_at.unwrap_or(now),
            updated_at: self.updated_at.unwrap_or(now),
        }
    }
}

/// Partial update for a document
#[derive(Debug, Clone, Default)]
pub struct DocumentPatch {
    pub title: Option<String>,
    pub tags: Option<Vec<String>>,
    pub collection_id: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
}

/// A sentence-aligned piece of a document with its embedding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chunk {
    pub id: String,
    pub doc_id: String,
    pub text: String,
    #[serde(default)]
    pub embedding: Vec<f32>,
    pub created_at: DateTime<Utc>,
}

impl Chunk {
    pub fn new(doc_id: impl Into<String>, text: impl Into<String>, embedding: Vec<f32>) -> Self {
        Self {
            id: generate_id("chunk"),
            doc_id: doc_id.into(),
            text: text.into(),
            embedding,
            created_at: Utc::now(),
        }
    }
}

/// One piece of context handed to an agent
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievedEntry {
    pub id: String,
    pub doc_id: String,
    pub title: String,
    pub content: String,
    /// Hybrid score; absent for whole-document fallbacks
    pub score: Option<f32>,
}
