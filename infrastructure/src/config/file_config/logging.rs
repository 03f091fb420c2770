//! Logging configuration from TOML (`[logging]` section)

use super::storage::expand_home;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// JSONL transcript of consultation events
    pub conversation_log: Option<String>,
    /// Directory for rolling diagnostic log files
    pub log_dir: Option<String>,
}

impl FileLoggingConfig {
    pub fn conversation_log_path(&self) -> Option<PathBuf> {
        self.conversation_log
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .map(|p| expand_home(p.trim()))
    }

    pub fn log_dir_path(&self) -> Option<PathBuf> {
        self.log_dir
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .map(|p| expand_home(p.trim()))
    }
}
