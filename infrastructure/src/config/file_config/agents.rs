//! Panel configuration from TOML (`[[agents]]` entries)

use consilium_domain::{Agent, ConfigIssue, ConfigIssueCode, Provider, ProviderConfig};
use serde::{Deserialize, Serialize};

/// Raw agent entry from TOML
///
/// # Example
///
/// ```toml
/// [[agents]]
/// id = "doc-1"
/// name = "Dr Zhang"
/// provider = "anthropic"          # openai, anthropic, gemini, siliconflow, modelscope
/// model = "claude-3-5-sonnet-latest"
/// api_key_env = "ANTHROPIC_API_KEY"
/// ```
///
/// Entries without an api key run in simulated mode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAgentConfig {
    pub id: String,
    pub name: String,
    pub provider: String,
    pub model: String,
    /// Direct API key (prefer `api_key_env`)
    pub api_key: Option<String>,
    /// Environment variable holding the API key
    pub api_key_env: Option<String>,
    pub base_url: Option<String>,
    pub custom_prompt: Option<String>,
}

impl FileAgentConfig {
    /// The API key, read from `api_key_env` when no direct key is given
    pub fn resolve_api_key(&self) -> String {
        if let Some(key) = self.api_key.as_deref().filter(|k| !k.trim().is_empty()) {
            return key.trim().to_string();
        }
        self.api_key_env
            .as_deref()
            .and_then(|var| std::env::var(var).ok())
            .map(|k| k.trim().to_string())
            .unwrap_or_default()
    }

    /// Convert the entry at `index` into an [`Agent`].
    ///
    /// Returns `None` with the reason when the entry cannot be used.
    pub fn to_agent(&self, index: usize) -> (Option<Agent>, Vec<ConfigIssue>) {
        let mut issues = Vec::new();

        if self.id.trim().is_empty() || self.name.trim().is_empty() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::IncompleteAgent { index },
                format!("agents[{}]: both id and name are required", index),
            ));
        }

        let provider = match self.provider.parse::<Provider>() {
            Ok(p) => Some(p),
            Err(_) => {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::InvalidEnumValue {
                        field: format!("agents[{}].provider", index),
                        value: self.provider.clone(),
                        valid_values: Provider::names(),
                    },
                    format!(
                        "agents[{}].provider: unknown value '{}'",
                        index, self.provider
                    ),
                ));
                None
            }
        };

        let Some(provider) = provider.filter(|_| issues.is_empty()) else {
            return (None, issues);
        };

        let mut config = ProviderConfig::new(provider, self.model.trim()).with_api_key(self.resolve_api_key());
        if let Some(url) = self.base_url.as_deref().filter(|u| !u.trim().is_empty()) {
            config = config.with_base_url(url.trim());
        }

        let mut agent = Agent::new(self.id.trim(), self.name.trim(), config);
        if let Some(prompt) = self.custom_prompt.as_deref().filter(|p| !p.trim().is_empty()) {
            agent = agent.with_custom_prompt(prompt);
        }
        (Some(agent), issues)
    }
}
