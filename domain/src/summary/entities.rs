//! Final summary entities

use crate::agent::entities::Agent;
use serde::{Deserialize, Serialize};

/// Lifecycle of the closing synthesis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryStatus {
    #[default]
    Idle,
    Pending,
    Ready,
    Error,
}

/// The closing report of a consultation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinalSummary {
    pub status: SummaryStatus,
    pub agent_id: Option<String>,
    pub agent_name: String,
    /// Summary text when ready, error description when failed
    pub content: String,
    pub used_prompt: String,
}

impl FinalSummary {
    pub fn pending(agent: &Agent, prompt: &str) -> Self {
        Self {
            status: SummaryStatus::Pending,
            agent_id: Some(agent.id.clone()),
            agent_name: agent.name.clone(),
            content: String::new(),
            used_prompt: prompt.to_string(),
        }
    }

    pub fn ready(agent: &Agent, content: impl Into<String>, prompt: &str) -> Self {
        Self {
            status: SummaryStatus::Ready,
            content: content.into(),
            ..Self::pending(agent, prompt)
        }
    }

    pub fn failed(agent: &Agent, message: &str, prompt: &str) -> Self {
        Self {
            status: SummaryStatus::Error,
            content: format!("Summary generation failed: {}", message),
            ..Self::pending(agent, prompt)
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status == SummaryStatus::Ready
    }
}

/// Agents to ask for the summary, in priority order.
///
/// Preferred agent, then the last agent that spoke successfully, then the
/// remaining active agents. When that yields nobody, the first declared agent.
pub fn summary_candidates<'a>(
    agents: &'a [Agent],
    preferred: Option<&str>,
    last_success: Option<&str>,
) -> Vec<&'a Agent> {
    let mut candidates: Vec<&Agent> = Vec::new();
    let mut push = |agent: &'a Agent, list: &mut Vec<&'a Agent>| {
        if !list.iter().any(|c| c.id == agent.id) {
            list.push(agent);
        }
    };

    for id in [preferred, last_success].into_iter().flatten() {
        if let Some(agent) = agents.iter().find(|a| a.id == id) {
            push(agent, &mut candidates);
        }
    }
    for agent in agents.iter().filter(|a| a.is_active()) {
        push(agent, &mut candidates);
    }
    if candidates.is_empty() {
        candidates.extend(agents.first());
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::entities::{Provider, ProviderConfig};

    fn panel() -> Vec<Agent> {
        ["a", "b", "c"]
            .iter()
            .map(|id| Agent::new(*id, id.to_uppercase(), ProviderConfig::new(Provider::OpenAi, "m")))
            .collect()
    }

    fn ids(list: &[&Agent]) -> Vec<String> {
        list.iter().map(|a| a.id.clone()).collect()
    }

    #[test]
    fn test_candidate_priority() {
        let agents = panel();
        let list = summary_candidates(&agents, Some("c"), Some("b"));
        assert_eq!(ids(&list), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_candidates_skip_duplicates_and_unknown() {
        let agents = panel();
        let list = summary_candidates(&agents, Some("zzz"), Some("a"));
        assert_eq!(ids(&list), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_eliminated_preferred_is_still_asked() {
        let mut agents = panel();
        agents[1].eliminate();
        agents[2].eliminate();
        let list = summary_candidates(&agents, Some("b"), None);
        assert_eq!(ids(&list), vec!["b", "a"]);
    }

    #[test]
    fn test_falls_back_to_first_declared() {
        let mut agents = panel();
        agents.iter_mut().for_each(|a| a.eliminate());
        let list = summary_candidates(&agents, None, None);
        assert_eq!(ids(&list), vec!["a"]);
        assert!(summary_candidates(&[], None, None).is_empty());
    }

    #[test]
    fn test_status_transitions() {
        let agents = panel();
        let pending = FinalSummary::pending(&agents[0], "p");
        assert_eq!(pending.status, SummaryStatus::Pending);
        let failed = FinalSummary::failed(&agents[0], "timeout", "p");
        assert_eq!(failed.content, "Summary generation failed: timeout");
        let ready = FinalSummary::ready(&agents[1], "done", "p");
        assert!(ready.is_ready());
        assert_eq!(ready.agent_id.as_deref(), Some("b"));
        assert_eq!(FinalSummary::default().status, SummaryStatus::Idle);
    }
}
