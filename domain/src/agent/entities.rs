//! Agent entities
//!
//! An [`Agent`] is one expert on the consultation panel. Agents are created
//! from configuration, reset at the start of every session, and only ever
//! change status through the vote tally.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Language-model provider backing an agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    OpenAi,
    Anthropic,
    Gemini,
    SiliconFlow,
    ModelScope,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Anthropic => "anthropic",
            Provider::Gemini => "gemini",
            Provider::SiliconFlow => "siliconflow",
            Provider::ModelScope => "modelscope",
        }
    }

    /// All accepted provider names, for validation messages
    pub fn names() -> Vec<String> {
        [
            Provider::OpenAi,
            Provider::Anthropic,
            Provider::Gemini,
            Provider::SiliconFlow,
            Provider::ModelScope,
        ]
        .iter()
        .map(|p| p.as_str().to_string())
        .collect()
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(Provider::OpenAi),
            "anthropic" | "claude" => Ok(Provider::Anthropic),
            "gemini" | "google" => Ok(Provider::Gemini),
            "siliconflow" => Ok(Provider::SiliconFlow),
            "modelscope" | "dashscope" => Ok(Provider::ModelScope),
            other => Err(format!("unknown provider: {}", other)),
        }
    }
}

/// Credentials and model selection for calling an agent's provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub provider: Provider,
    pub model: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub base_url: Option<String>,
}

impl ProviderConfig {
    pub fn new(provider: Provider, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            api_key: String::new(),
            base_url: None,
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = key.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }
}

/// Whether an agent still takes part in the discussion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    #[default]
    Active,
    Eliminated,
}

/// A panel member (Entity)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: String,
    pub name: String,
    pub provider: ProviderConfig,
    #[serde(default)]
    pub status: AgentStatus,
    #[serde(default)]
    pub votes: u32,
    /// Replaces the consultation-wide system prompt for this agent
    #[serde(default)]
    pub custom_prompt: Option<String>,
}

impl Agent {
    pub fn new(id: impl Into<String>, name: impl Into<String>, provider: ProviderConfig) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            provider,
            status: AgentStatus::Active,
            votes: 0,
            custom_prompt: None,
        }
    }

    pub fn with_custom_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.custom_prompt = Some(prompt.into());
        self
    }

    pub fn is_active(&self) -> bool {
        self.status == AgentStatus::Active
    }

    /// Whether the agent can make real provider calls.
    ///
    /// Agents without credentials run in simulated mode.
    pub fn has_credentials(&self) -> bool {
        !self.provider.api_key.trim().is_empty()
    }

    /// Restore the agent to the start-of-session state
    pub fn reset(&mut self) {
        self.status = AgentStatus::Active;
        self.votes = 0;
    }

    pub fn eliminate(&mut self) {
        self.status = AgentStatus::Eliminated;
    }

    /// The system prompt this agent speaks under
    pub fn system_prompt<'a>(&'a self, global: &'a str) -> &'a str {
        match &self.custom_prompt {
            Some(p) if !p.trim().is_empty() => p,
            _ => global,
        }
    }
}
