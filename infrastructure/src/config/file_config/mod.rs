//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted to domain types on demand.

mod agents;
mod consultation;
mod logging;
mod storage;

pub use agents::FileAgentConfig;
pub use consultation::FileConsultationConfig;
pub use logging::FileLoggingConfig;
pub use storage::FileStorageConfig;

use consilium_domain::{Agent, ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Prompts, turn order and pacing
    pub consultation: FileConsultationConfig,
    /// Panel members (`[[agents]]`)
    pub agents: Vec<FileAgentConfig>,
    /// Knowledge base storage location
    pub storage: FileStorageConfig,
    /// Conversation transcript and log files
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    ///
    /// This is the single entry point for config validation. It checks:
    /// 1. Consultation settings (turn order, stall cap)
    /// 2. Each agent entry (provider, id, name)
    /// 3. Agent id uniqueness
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        issues.extend(self.consultation.to_settings().1);

        for (index, agent) in self.agents.iter().enumerate() {
            issues.extend(agent.to_agent(index).1);
        }

        let mut seen = HashSet::new();
        for agent in &self.agents {
            let id = agent.id.trim();
            if !id.is_empty() && !seen.insert(id) {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::DuplicateAgentId { id: id.to_string() },
                    format!("agents: id '{}' is used more than once", id),
                ));
            }
        }

        issues
    }

    /// Build the panel from `[[agents]]`, skipping unusable entries
    pub fn build_agents(&self) -> Vec<Agent> {
        let mut seen = HashSet::new();
        self.agents
            .iter()
            .enumerate()
            .filter_map(|(index, raw)| raw.to_agent(index).0)
            .filter(|agent| seen.insert(agent.id.clone()))
            .collect()
    }
}
