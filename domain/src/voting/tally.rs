//! Vote tallying

use crate::agent::entities::Agent;
use crate::voting::record::VoteRecord;

/// Result of counting one voting phase
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TallyOutcome {
    /// A single agent holds the strict maximum
    Eliminated {
        agent_id: String,
        agent_name: String,
        votes: u32,
    },
    /// Nobody received a vote, or the maximum is shared
    NoElimination { max_votes: u32 },
}

impl TallyOutcome {
    pub fn is_elimination(&self) -> bool {
        matches!(self, TallyOutcome::Eliminated { .. })
    }

    /// Announcement text for the vote result entry
    pub fn message(&self) -> String {
        match self {
            TallyOutcome::Eliminated { agent_name, .. } => format!(
                "Evaluation finished: {} was marked as least accurate and withdraws from further discussion.",
                agent_name
            ),
            TallyOutcome::NoElimination { .. } => "Evaluation finished: opinions were split or unclear, \
                 no one was marked as least accurate this round."
                .to_string(),
        }
    }
}

/// Credit each vote to its target. Votes for unknown ids are ignored.
pub fn apply_votes(agents: &mut [Agent], votes: &[VoteRecord]) {
    for vote in votes {
        if let Some(target) = agents.iter_mut().find(|a| a.id == vote.target_id) {
            target.votes += 1;
        }
    }
}

/// Count the votes held by active agents.
///
/// Eliminated agents are never considered. Elimination requires a unique,
/// non-zero maximum.
pub fn tally(agents: &[Agent]) -> TallyOutcome {
    let active: Vec<&Agent> = agents.iter().filter(|a| a.is_active()).collect();
    let max_votes = active.iter().map(|a| a.votes).max().unwrap_or(0);
    if max_votes == 0 {
        return TallyOutcome::NoElimination { max_votes };
    }

    let mut top = active.iter().filter(|a| a.votes == max_votes);
    match (top.next(), top.next()) {
        (Some(agent), None) => TallyOutcome::Eliminated {
            agent_id: agent.id.clone(),
            agent_name: agent.name.clone(),
            votes: max_votes,
        },
        _ => TallyOutcome::NoElimination { max_votes },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::entities::{Provider, ProviderConfig};

    fn panel(votes: &[(&str, u32)]) -> Vec<Agent> {
        votes
            .iter()
            .map(|(id, v)| {
                let mut a = Agent::new(*id, id.to_uppercase(), ProviderConfig::new(Provider::OpenAi, "m"));
                a.votes = *v;
                a
            })
            .collect()
    }

    #[test]
    fn test_shared_maximum_is_no_elimination() {
        let outcome = tally(&panel(&[("a", 2), ("b", 2), ("c", 1)]));
        assert_eq!(outcome, TallyOutcome::NoElimination { max_votes: 2 });
        assert!(!outcome.is_elimination());
    }

    #[test]
    fn test_unique_maximum_is_eliminated() {
        let outcome = tally(&panel(&[("a", 3), ("b", 1)]));
        assert_eq!(
            outcome,
            TallyOutcome::Eliminated {
                agent_id: "a".into(),
                agent_name: "A".into(),
                votes: 3
            }
        );
        assert!(outcome.message().contains("A was marked"));
    }

    #[test]
    fn test_zero_votes_is_no_elimination() {
        assert_eq!(
            tally(&panel(&[("a", 0), ("b", 0)])),
            TallyOutcome::NoElimination { max_votes: 0 }
        );
        assert_eq!(tally(&[]), TallyOutcome::NoElimination { max_votes: 0 });
    }

    #[test]
    fn test_eliminated_agents_are_ignored() {
        let mut agents = panel(&[("a", 5), ("b", 2), ("c", 1)]);
        agents[0].eliminate();
        match tally(&agents) {
            TallyOutcome::Eliminated { agent_id, .. } => assert_eq!(agent_id, "b"),
            other => panic!("expected elimination, got {:?}", other),
        }
    }

    #[test]
    fn test_apply_votes() {
        let mut agents = panel(&[("a", 0), ("b", 0)]);
        let vote = |target: &str| VoteRecord {
            round: 1,
            voter_id: "a".into(),
            voter_name: "A".into(),
            target_id: target.into(),
            target_name: target.to_uppercase(),
            reason: String::new(),
        };
        apply_votes(&mut agents, &[vote("b"), vote("b"), vote("zzz")]);
        assert_eq!(agents[0].votes, 0);
        assert_eq!(agents[1].votes, 2);
    }
}
