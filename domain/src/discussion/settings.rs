//! Consultation settings

use super::turn_order::TurnOrder;
use serde::{Deserialize, Serialize};

pub const DEFAULT_SYSTEM_PROMPT: &str = r#"You are a senior, highly experienced clinical diagnostician. Your task is to analyse the patient record provided and reach a diagnosis.

You are taking part in a multi-specialist consultation and will see the opinions of the other doctors. Consider their analysis, which may inspire you, but keep your own independent professional judgement.

Your contribution must follow these principles:
1. Rigour: base your analysis on medical knowledge and the record.
2. Independence: do not change your core position just to agree with others. If another doctor is right, say so and build on it; if you disagree, say so clearly and give your reasons.
3. Focus: the only goal of the consultation is the best outcome for the patient.
4. Clarity: state your core diagnosis, analysis and recommendations directly.

Now give your opinion based on the record and the discussion so far."#;

pub const DEFAULT_SUMMARY_PROMPT: &str = "Based on the complete consultation, write the final summary in the voice of a clinician: core diagnosis, supporting evidence, differential diagnosis, recommended investigations, treatment recommendations, follow-up plan and risk warnings.";

/// Settings that shape one consultation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsultationSettings {
    /// System prompt for agents without a custom prompt
    pub system_prompt: String,
    /// Instruction used for the closing synthesis
    pub summary_prompt: String,
    pub turn_order: TurnOrder,
    /// Stall cap: consecutive rounds without elimination before finishing
    pub max_rounds_without_elimination: u32,
}

impl Default for ConsultationSettings {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            summary_prompt: DEFAULT_SUMMARY_PROMPT.to_string(),
            turn_order: TurnOrder::Random,
            max_rounds_without_elimination: 3,
        }
    }
}

impl ConsultationSettings {
    pub fn with_turn_order(mut self, order: TurnOrder) -> Self {
        self.turn_order = order;
        self
    }

    pub fn with_max_rounds_without_elimination(mut self, cap: u32) -> Self {
        self.max_rounds_without_elimination = cap;
        self
    }

    /// The summary instruction, falling back to the built-in one when blank
    pub fn effective_summary_prompt(&self) -> &str {
        if self.summary_prompt.trim().is_empty() {
            DEFAULT_SUMMARY_PROMPT
        } else {
            &self.summary_prompt
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = ConsultationSettings::default();
        assert_eq!(settings.turn_order, TurnOrder::Random);
        assert_eq!(settings.max_rounds_without_elimination, 3);
        assert!(settings.system_prompt.contains("diagnostician"));
    }

    #[test]
    fn test_blank_summary_prompt_falls_back() {
        let mut settings = ConsultationSettings::default();
        settings.summary_prompt = " ".to_string();
        assert_eq!(settings.effective_summary_prompt(), DEFAULT_SUMMARY_PROMPT);
    }

    #[test]
    fn test_partial_deserialize() {
        let settings: ConsultationSettings =
            serde_json::from_str(r#"{"turn_order":"fixed"}"#).unwrap();
        assert_eq!(settings.turn_order, TurnOrder::Fixed);
        assert_eq!(settings.max_rounds_without_elimination, 3);
    }
}
