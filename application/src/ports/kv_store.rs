//! Key-value storage port
//!
//! The knowledge base persists its collections and configuration as JSON
//! strings under fixed keys.

use std::collections::HashMap;
use std::sync::Mutex;
use thiserror::Error;

pub const DOCS_KEY: &str = "kb_docs_v1";
pub const CHUNKS_KEY: &str = "kb_chunks_v1";
pub const EMBEDDING_CONFIG_KEY: &str = "kb_embedding_config_v1";
pub const RETRIEVAL_CONFIG_KEY: &str = "kb_retrieval_config_v1";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("storage I/O error: {0}")]
    Io(String),

    #[error("storage lock poisoned")]
    Poisoned,
}

/// Simple string key-value storage
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Volatile store for tests and throwaway sessions
#[derive(Default)]
pub struct InMemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for InMemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let values = self.values.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut values = self.values.lock().map_err(|_| StoreError::Poisoned)?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_round_trip() {
        let store = InMemoryStore::new();
        assert_eq!(store.get(DOCS_KEY).unwrap(), None);
        store.set(DOCS_KEY, "[]").unwrap();
        assert_eq!(store.get(DOCS_KEY).unwrap().as_deref(), Some("[]"));
    }
}
