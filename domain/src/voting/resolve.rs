//! Vote target resolution
//!
//! A parsed decision is only honoured when it names an active agent. Anything
//! else resolves to a self-vote, so a voter that cannot express a choice never
//! scapegoats a colleague.

use crate::agent::entities::Agent;
use crate::voting::parsing::VoteDecision;

/// Reason recorded when the voter had no credentials
pub const SIMULATED_REASON: &str = "Simulated mode: marks its own answer as needing further support.";

const SELF_FALLBACK_REASON: &str = "Vote could not be parsed; defaulting to self.";
const OTHER_FALLBACK_REASON: &str = "Vote could not be parsed; defaulting to another agent.";
const DEFAULT_REASON: &str = "Judgement made after reviewing the discussion.";

/// How the final target was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The parsed target was valid
    Parsed,
    SelfFallback,
    OtherFallback,
}

/// A vote ready to be recorded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVote {
    pub target_id: String,
    pub target_name: String,
    pub reason: String,
    pub resolution: Resolution,
}

/// Resolve a decision (or its absence, after a gateway failure) into a target.
///
/// Returns `None` only when the panel holds nobody but an inactive voter.
pub fn resolve_vote(decision: Option<&VoteDecision>, voter: &Agent, agents: &[Agent]) -> Option<ResolvedVote> {
    let reason = decision
        .filter(|d| d.has_target())
        .map(|d| d.reason.trim().to_string())
        .filter(|r| !r.is_empty());

    if let Some(target) = decision
        .filter(|d| d.has_target())
        .and_then(|d| agents.iter().find(|a| a.id == d.target && a.is_active()))
    {
        return Some(ResolvedVote {
            target_id: target.id.clone(),
            target_name: target.name.clone(),
            reason: reason.unwrap_or_else(|| DEFAULT_REASON.to_string()),
            resolution: Resolution::Parsed,
        });
    }

    let (target, resolution, fallback_reason) = if voter.is_active() {
        (voter, Resolution::SelfFallback, SELF_FALLBACK_REASON)
    } else {
        let other = agents
            .iter()
            .filter(|a| a.id != voter.id)
            .find(|a| a.is_active())
            .or_else(|| agents.iter().find(|a| a.id != voter.id))?;
        (other, Resolution::OtherFallback, OTHER_FALLBACK_REASON)
    };

    Some(ResolvedVote {
        target_id: target.id.clone(),
        target_name: target.name.clone(),
        reason: reason.unwrap_or_else(|| fallback_reason.to_string()),
        resolution,
    })
}

/// The vote cast by an agent running without credentials
pub fn simulated_self_vote(voter: &Agent) -> ResolvedVote {
    ResolvedVote {
        target_id: voter.id.clone(),
        target_name: voter.name.clone(),
        reason: SIMULATED_REASON.to_string(),
        resolution: Resolution::SelfFallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::entities::{Provider, ProviderConfig};
    use crate::voting::parsing::parse_vote;

    fn agents() -> Vec<Agent> {
        ["a", "b", "c"]
            .iter()
            .map(|id| Agent::new(*id, id.to_uppercase(), ProviderConfig::new(Provider::OpenAi, "m")))
            .collect()
    }

    #[test]
    fn test_valid_target_is_kept() {
        let agents = agents();
        let decision = parse_vote(r#"{"targetDoctorId":"b","reason":"weak"}"#, &agents);
        let vote = resolve_vote(Some(&decision), &agents[0], &agents).unwrap();
        assert_eq!(vote.target_id, "b");
        assert_eq!(vote.reason, "weak");
        assert_eq!(vote.resolution, Resolution::Parsed);
    }

    #[test]
    fn test_missing_reason_gets_default() {
        let agents = agents();
        let decision = parse_vote(r#"{"targetDoctorId":"c"}"#, &agents);
        let vote = resolve_vote(Some(&decision), &agents[0], &agents).unwrap();
        assert_eq!(vote.reason, DEFAULT_REASON);
    }

    #[test]
    fn test_unparsed_resolves_to_self() {
        let agents = agents();
        let decision = parse_vote("no idea", &agents);
        let vote = resolve_vote(Some(&decision), &agents[1], &agents).unwrap();
        assert_eq!(vote.target_id, "b");
        assert_eq!(vote.resolution, Resolution::SelfFallback);
    }

    #[test]
    fn test_eliminated_target_resolves_to_self() {
        let mut agents = agents();
        agents[2].eliminate();
        let decision = parse_vote(r#"{"targetDoctorId":"c","reason":"x"}"#, &agents);
        let vote = resolve_vote(Some(&decision), &agents[0], &agents).unwrap();
        assert_eq!(vote.target_id, "a");
        assert_eq!(vote.reason, "x");
    }

    #[test]
    fn test_targetless_json_resolves_to_self_with_fallback_reason() {
        let agents = agents();
        let decision = parse_vote(r#"{"reason": "B was thorough, I agree with B"}"#, &agents);
        let vote = resolve_vote(Some(&decision), &agents[0], &agents).unwrap();
        assert_eq!(vote.target_id, "a");
        assert_eq!(vote.resolution, Resolution::SelfFallback);
        assert_eq!(vote.reason, SELF_FALLBACK_REASON);
    }

    #[test]
    fn test_gateway_failure_resolves_to_self() {
        let agents = agents();
        let vote = resolve_vote(None, &agents[0], &agents).unwrap();
        assert_eq!(vote.target_id, "a");
        assert_eq!(vote.reason, SELF_FALLBACK_REASON);
    }

    #[test]
    fn test_inactive_voter_falls_back_to_other() {
        let mut agents = agents();
        agents[0].eliminate();
        let vote = resolve_vote(None, &agents[0], &agents).unwrap();
        assert_eq!(vote.target_id, "b");
        assert_eq!(vote.resolution, Resolution::OtherFallback);
    }

    #[test]
    fn test_simulated_vote() {
        let agents = agents();
        let vote = simulated_self_vote(&agents[2]);
        assert_eq!(vote.target_id, "c");
        assert_eq!(vote.reason, SIMULATED_REASON);
    }
}
