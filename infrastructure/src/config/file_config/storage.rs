//! Storage configuration from TOML (`[storage]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where the knowledge base is persisted
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStorageConfig {
    /// Directory for the knowledge store (default: platform data dir)
    pub data_dir: Option<String>,
}

impl FileStorageConfig {
    /// Resolve the data directory.
    ///
    /// Falls back to `$XDG_DATA_HOME/consilium`, then `./.consilium`.
    pub fn resolve_data_dir(&self) -> PathBuf {
        if let Some(dir) = self.data_dir.as_deref().filter(|d| !d.trim().is_empty()) {
            return expand_home(dir.trim());
        }
        dirs::data_dir()
            .map(|d| d.join("consilium"))
            .unwrap_or_else(|| PathBuf::from(".consilium"))
    }
}

/// Expand a leading `~/` to the home directory
pub(crate) fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_data_dir() {
        let config = FileStorageConfig {
            data_dir: Some("/srv/consilium".to_string()),
        };
        assert_eq!(config.resolve_data_dir(), PathBuf::from("/srv/consilium"));
    }

    #[test]
    fn test_default_data_dir_is_named() {
        let dir = FileStorageConfig::default().resolve_data_dir();
        assert!(dir.to_string_lossy().contains("consilium"));
    }
}
