//! Embedding and retrieval configuration

use serde::{Deserialize, Serialize};

pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-v3";
pub const DEFAULT_TOP_K: u32 = 5;
pub const DEFAULT_KEYWORD_WEIGHT: f32 = 0.5;
pub const MAX_TOP_K: u32 = 10;

/// Embedding provider settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmbeddingConfig {
    pub model: String,
    pub api_key: String,
    pub base_url: String,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
            api_key: String::new(),
            base_url: String::new(),
        }
    }
}

impl EmbeddingConfig {
    /// Parse a stored config; anything unreadable yields the defaults
    pub fn from_stored(raw: Option<&str>) -> Self {
        raw.and_then(|r| serde_json::from_str::<Self>(r).ok())
            .map(Self::normalized)
            .unwrap_or_default()
    }

    /// Fill an empty model with the default
    pub fn normalized(mut self) -> Self {
        if self.model.trim().is_empty() {
            self.model = DEFAULT_EMBEDDING_MODEL.to_string();
        }
        self
    }

    pub fn has_credentials(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

/// Hybrid retrieval parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalConfig {
    pub top_k: u32,
    pub keyword_weight: f32,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            keyword_weight: DEFAULT_KEYWORD_WEIGHT,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredRetrieval {
    top_k: Option<f64>,
    keyword_weight: Option<f64>,
}

impl RetrievalConfig {
    /// Build a config from possibly out-of-range values
    pub fn bounded(top_k: f64, keyword_weight: f64) -> Self {
        Self {
            top_k: bound_top_k(top_k),
            keyword_weight: bound_weight(keyword_weight),
        }
    }

    /// Parse a stored config; unreadable or non-finite fields take defaults
    pub fn from_stored(raw: Option<&str>) -> Self {
        let Some(stored) = raw.and_then(|r| serde_json::from_str::<StoredRetrieval>(r).ok()) else {
            return Self::default();
        };
        Self::bounded(
            stored.top_k.filter(|v| v.is_finite()).unwrap_or(DEFAULT_TOP_K as f64),
            stored
                .keyword_weight
                .filter(|v| v.is_finite())
                .unwrap_or(DEFAULT_KEYWORD_WEIGHT as f64),
        )
    }
}

/// Floor and clamp to `[1, 10]`; non-finite input yields the default
pub fn bound_top_k(value: f64) -> u32 {
    if !value.is_finite() {
        return DEFAULT_TOP_K;
    }
    value.floor().clamp(1.0, MAX_TOP_K as f64) as u32
}

/// Clamp to `[0, 1]`; non-finite input yields the default
pub fn bound_weight(value: f64) -> f32 {
    if !value.is_finite() {
        return DEFAULT_KEYWORD_WEIGHT;
    }
    value.clamp(0.0, 1.0) as f32
}
