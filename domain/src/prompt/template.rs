//! Prompt templates for the consultation flow

use super::context::{format_case, format_knowledge, format_linked_cases};
use crate::agent::entities::Agent;
use crate::case::entities::{Case, LinkedCase};
use crate::knowledge::entities::RetrievedEntry;
use crate::voting::parsing::TARGET_FIELD;

/// System and user prompt for a single provider call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptBundle {
    pub system: String,
    pub user: String,
}

/// Shared context every prompt is built from
#[derive(Debug, Clone, Copy)]
pub struct PromptContext<'a> {
    pub case: &'a Case,
    pub linked: &'a [LinkedCase],
    pub knowledge: &'a [RetrievedEntry],
}

impl PromptContext<'_> {
    fn render(&self) -> String {
        [
            format_case(self.case),
            format_linked_cases(self.linked),
            format_knowledge(self.knowledge),
        ]
        .into_iter()
        .filter(|block| !block.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
    }
}

/// Templates for generating prompts at each stage
pub struct PromptTemplate;

impl PromptTemplate {
    /// Prompt for an agent's discussion turn
    pub fn discussion(system_prompt: &str, ctx: PromptContext<'_>, speaker: &Agent) -> PromptBundle {
        PromptBundle {
            system: system_prompt.to_string(),
            user: format!(
                r#"{}
You are {}. The discussion so far precedes this message.
Give your diagnosis, the reasoning behind it, and your recommendations. Respond to your colleagues where you agree or disagree."#,
                ctx.render(),
                speaker.name
            ),
        }
    }

    /// Prompt asking a voter to name the least accurate panel member
    pub fn vote(system_prompt: &str, ctx: PromptContext<'_>, candidates: &[Agent], voter: &Agent) -> PromptBundle {
        let mut roster = String::new();
        for agent in candidates {
            let marker = if agent.id == voter.id { " (you)" } else { "" };
            roster.push_str(&format!("- {}: {}{}\n", agent.id, agent.name, marker));
        }

        PromptBundle {
            system: system_prompt.to_string(),
            user: format!(
                r#"{}
You are {}. This round of discussion is over. Review every panel member's contributions, your own included, and pick the one whose analysis is least accurate.

Panel members:
{}
Reply with JSON only, no other text:
{{"{}": "<member id>", "reason": "<one sentence>"}}"#,
                ctx.render(),
                voter.name,
                roster,
                TARGET_FIELD
            ),
        }
    }

    /// Prompt for the closing synthesis
    pub fn summary(summary_prompt: &str, ctx: PromptContext<'_>, summarizer: &Agent) -> PromptBundle {
        PromptBundle {
            system: format!(
                "You are {}, writing the final report of a multi-specialist consultation. Be precise and clinically grounded.",
                summarizer.name
            ),
            user: format!("{}\n{}", ctx.render(), summary_prompt),
        }
    }
}
