//! Consultation configuration from TOML (`[consultation]` section)

use consilium_application::ExecutionParams;
use consilium_domain::discussion::settings::{DEFAULT_SUMMARY_PROMPT, DEFAULT_SYSTEM_PROMPT};
use consilium_domain::{ConfigIssue, ConfigIssueCode, ConsultationSettings, TurnOrder};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw consultation configuration from TOML
///
/// # Example
///
/// ```toml
/// [consultation]
/// turn_order = "random"                  # "random" or "fixed"
/// max_rounds_without_elimination = 3
/// call_timeout_secs = 60
/// reveal_chunk_chars = 1
/// reveal_delay_ms = 15
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConsultationConfig {
    /// Replaces the built-in system prompt
    pub system_prompt: Option<String>,
    /// Replaces the built-in summary instruction
    pub summary_prompt: Option<String>,
    pub turn_order: String,
    /// Stall cap
    pub max_rounds_without_elimination: u32,
    pub call_timeout_secs: u64,
    /// Characters revealed per step; 0 reveals whole replies at once
    pub reveal_chunk_chars: usize,
    pub reveal_delay_ms: u64,
}

impl Default for FileConsultationConfig {
    fn default() -> Self {
        let params = ExecutionParams::default();
        Self {
            system_prompt: None,
            summary_prompt: None,
            turn_order: "random".to_string(),
            max_rounds_without_elimination: 3,
            call_timeout_secs: params.call_timeout.as_secs(),
            reveal_chunk_chars: params.reveal_chunk_chars,
            reveal_delay_ms: params.reveal_delay.as_millis() as u64,
        }
    }
}

impl FileConsultationConfig {
    /// Parse turn_order, falling back to random
    pub fn parse_turn_order(&self) -> (TurnOrder, Vec<ConfigIssue>) {
        match self.turn_order.parse::<TurnOrder>() {
            Ok(order) => (order, vec![]),
            Err(_) => {
                let issue = ConfigIssue::warning(
                    ConfigIssueCode::InvalidEnumValue {
                        field: "consultation.turn_order".to_string(),
                        value: self.turn_order.clone(),
                        valid_values: vec!["random".to_string(), "fixed".to_string()],
                    },
                    format!(
                        "consultation.turn_order: unknown value '{}', falling back to 'random'",
                        self.turn_order
                    ),
                );
                (TurnOrder::Random, vec![issue])
            }
        }
    }

    /// Convert to domain settings, reporting what had to be corrected
    pub fn to_settings(&self) -> (ConsultationSettings, Vec<ConfigIssue>) {
        let (turn_order, mut issues) = self.parse_turn_order();

        let mut cap = self.max_rounds_without_elimination;
        if cap == 0 {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::OutOfRange {
                    field: "consultation.max_rounds_without_elimination".to_string(),
                },
                "consultation.max_rounds_without_elimination: must be at least 1, using 1",
            ));
            cap = 1;
        }

        let pick = |value: &Option<String>, fallback: &str| match value {
            Some(v) if !v.trim().is_empty() => v.clone(),
            _ => fallback.to_string(),
        };

        let settings = ConsultationSettings {
            system_prompt: pick(&self.system_prompt, DEFAULT_SYSTEM_PROMPT),
            summary_prompt: pick(&self.summary_prompt, DEFAULT_SUMMARY_PROMPT),
            turn_order,
            max_rounds_without_elimination: cap,
        };
        (settings, issues)
    }

    pub fn to_execution_params(&self) -> ExecutionParams {
        ExecutionParams::default()
            .with_call_timeout(Duration::from_secs(self.call_timeout_secs.max(1)))
            .with_reveal(
                self.reveal_chunk_chars,
                Duration::from_millis(self.reveal_delay_ms),
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_domain_defaults() {
        let (settings, issues) = FileConsultationConfig::default().to_settings();
        assert!(issues.is_empty());
        assert_eq!(settings, ConsultationSettings::default());
    }

    #[test]
    fn test_custom_prompts_override() {
        let config = FileConsultationConfig {
            system_prompt: Some("Be brief.".to_string()),
            summary_prompt: Some("   ".to_string()),
            ..Default::default()
        };
        let (settings, _) = config.to_settings();
        assert_eq!(settings.system_prompt, "Be brief.");
        assert_eq!(settings.summary_prompt, DEFAULT_SUMMARY_PROMPT);
    }

    #[test]
    fn test_execution_params() {
        let config = FileConsultationConfig {
            call_timeout_secs: 0,
            reveal_chunk_chars: 4,
            reveal_delay_ms: 0,
            ..Default::default()
        };
        let params = config.to_execution_params();
        assert_eq!(params.call_timeout, Duration::from_secs(1));
        assert_eq!(params.reveal_chunk_chars, 4);
        assert!(params.reveal_delay.is_zero());
    }
}
