//! Rendering of case, linked cases, knowledge and history into prompt text

use crate::case::entities::{Case, LinkedCase};
use crate::discussion::history::{DiscussionHistory, Entry};
use crate::knowledge::entities::RetrievedEntry;
use serde::{Deserialize, Serialize};

/// Number of trailing history entries folded into the retrieval query
pub const QUERY_HISTORY_ENTRIES: usize = 4;

/// Role of a provider-facing history message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A history message as sent to a provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderMessage {
    pub role: Role,
    pub content: String,
}

impl ProviderMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Patient record block
pub fn format_case(case: &Case) -> String {
    let mut out = String::from("## Patient record\n");
    push_field(&mut out, "Name", &case.name);
    push_field(&mut out, "Gender", &case.gender);
    if let Some(age) = case.age {
        out.push_str(&format!("- Age: {}\n", age));
    }
    push_field(&mut out, "Past history", &case.past_history);
    push_field(&mut out, "Current problem", &case.current_problem);
    push_field(&mut out, "Image findings", &case.image_summary);
    out
}

fn push_field(out: &mut String, label: &str, value: &str) {
    let value = value.trim();
    if !value.is_empty() {
        out.push_str(&format!("- {}: {}\n", label, value));
    }
}

/// Earlier consultations attached for reference; empty when there are none
pub fn format_linked_cases(linked: &[LinkedCase]) -> String {
    if linked.is_empty() {
        return String::new();
    }
    let mut out = String::from("## Earlier consultations (reference only)\n");
    for case in linked {
        out.push_str(&format!("\n### {}\n", case.consultation_name));
        push_field(&mut out, "Patient", &case.patient_name);
        push_field(&mut out, "Gender", &case.patient_gender);
        if let Some(age) = case.patient_age {
            out.push_str(&format!("- Age: {}\n", age));
        }
        push_field(&mut out, "Past history", &case.past_history);
        push_field(&mut out, "Problem", &case.current_problem);
        push_field(&mut out, "Image findings", &case.image_summary);
        push_field(&mut out, "Final summary", &case.final_summary);
        push_field(&mut out, "Finished", &case.finished_at);
    }
    out
}

/// Retrieved knowledge block; empty when nothing was retrieved
pub fn format_knowledge(entries: &[RetrievedEntry]) -> String {
    if entries.is_empty() {
        return String::new();
    }
    let mut out = String::from("## Reference knowledge\n");
    for (idx, entry) in entries.iter().enumerate() {
        out.push_str(&format!("\n[{}] {}\n{}\n", idx + 1, entry.title, entry.content.trim()));
    }
    out
}

/// History as provider messages from one agent's point of view.
///
/// The agent's own turns become assistant messages; patient messages and
/// other agents' turns become user messages prefixed with their author.
/// Workflow announcements and votes are left out. Consecutive messages of
/// the same role are merged so roles alternate, and the list always opens
/// with a user message.
pub fn provider_history(history: &DiscussionHistory, agent_id: &str) -> Vec<ProviderMessage> {
    let mut messages: Vec<ProviderMessage> = Vec::new();
    for entry in history.settled() {
        let message = match entry {
            Entry::Doctor {
                doctor_id, content, ..
            } if doctor_id == agent_id => ProviderMessage::assistant(content.clone()),
            Entry::Doctor {
                doctor_name, content, ..
            } => ProviderMessage::user(format!("{}: {}", doctor_name, content)),
            Entry::Patient { author, content } => ProviderMessage::user(format!("{}: {}", author, content)),
            Entry::System { .. } | Entry::VoteDetail(_) | Entry::VoteResult { .. } => continue,
        };
        match messages.last_mut() {
            Some(last) if last.role == message.role => {
                last.content.push_str("\n\n");
                last.content.push_str(&message.content);
            }
            _ => messages.push(message),
        }
    }
    if messages.first().is_some_and(|m| m.role == Role::Assistant) {
        messages.insert(0, ProviderMessage::user("The consultation has started."));
    }
    messages
}

/// Query text used to retrieve knowledge for the current state of a case
pub fn case_query_text(case: &Case, history: &DiscussionHistory) -> String {
    let mut parts = Vec::new();
    let mut push = |label: &str, value: &str| {
        if !value.trim().is_empty() {
            parts.push(format!("{}: {}", label, value.trim()));
        }
    };
    push("Patient", &case.name);
    push("Gender", &case.gender);
    if let Some(age) = case.age {
        push("Age", &age.to_string());
    }
    push("Past history", &case.past_history);
    push("Chief complaint", &case.current_problem);
    push("Image findings", &case.image_summary);

    let excerpt = history
        .tail(QUERY_HISTORY_ENTRIES)
        .iter()
        .map(|entry| {
            let speaker = match entry {
                Entry::Doctor { doctor_name, .. } if !doctor_name.is_empty() => doctor_name.as_str(),
                Entry::Doctor { .. } => "Doctor",
                _ => "Patient",
            };
            format!("{}: {}", speaker, entry.content())
        })
        .collect::<Vec<_>>()
        .join("; ");
    if !excerpt.is_empty() {
        parts.push(format!("Discussion excerpt: {}", excerpt));
    }
    parts.join("\n")
}
