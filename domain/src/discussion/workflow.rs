//! Workflow state machine
//!
//! ```text
//! setup ──▶ discussion ──▶ voting ──┬──▶ discussion (next round)
//!                                   └──▶ finished (terminal)
//! ```

use crate::agent::entities::Agent;
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Phase of a consultation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Setup,
    Discussion,
    Voting,
    Finished,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Setup => "setup",
            Phase::Discussion => "discussion",
            Phase::Voting => "voting",
            Phase::Finished => "finished",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Phase::Setup => "Setup",
            Phase::Discussion => "Discussion",
            Phase::Voting => "Voting",
            Phase::Finished => "Finished",
        }
    }

    /// Whether the state machine allows moving from `self` to `next`
    pub fn can_transition_to(&self, next: Phase) -> bool {
        matches!(
            (self, next),
            (Phase::Setup, Phase::Discussion)
                | (Phase::Discussion, Phase::Voting)
                | (Phase::Voting, Phase::Discussion)
                | (Phase::Voting, Phase::Finished)
        )
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Turn progress within the current round
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub total: usize,
    pub done: usize,
    /// Display name of the agent currently speaking
    pub current: String,
}

/// Mutable workflow state of one consultation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowState {
    phase: Phase,
    current_round: u32,
    rounds_without_elimination: u32,
    turn_queue: Vec<String>,
    active_turn: Option<String>,
    paused: bool,
    progress: Progress,
}

impl WorkflowState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn current_round(&self) -> u32 {
        self.current_round
    }

    pub fn rounds_without_elimination(&self) -> u32 {
        self.rounds_without_elimination
    }

    pub fn turn_queue(&self) -> &[String] {
        &self.turn_queue
    }

    pub fn active_turn(&self) -> Option<&str> {
        self.active_turn.as_deref()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    fn transition(&mut self, next: Phase) -> Result<(), DomainError> {
        if !self.phase.can_transition_to(next) {
            return Err(DomainError::InvalidTransition {
                from: self.phase.as_str().to_string(),
                to: next.as_str().to_string(),
            });
        }
        self.phase = next;
        Ok(())
    }

    /// Reset for a new session and enter round 1.
    ///
    /// Allowed from `setup` and from a `finished` session; a session in
    /// progress must finish first.
    /// Fails unless a session may start from the current phase
    pub fn ensure_can_begin(&self) -> Result<(), DomainError> {
        if matches!(self.phase, Phase::Setup | Phase::Finished) {
            Ok(())
        } else {
            Err(DomainError::InvalidTransition {
                from: self.phase.as_str().to_string(),
                to: Phase::Discussion.as_str().to_string(),
            })
        }
    }

    pub fn begin_session(&mut self, queue: Vec<String>) -> Result<(), DomainError> {
        self.ensure_can_begin()?;
        *self = Self {
            phase: Phase::Discussion,
            current_round: 1,
            ..Self::default()
        };
        self.set_queue(queue);
        Ok(())
    }

    fn set_queue(&mut self, queue: Vec<String>) {
        self.progress = Progress {
            total: queue.len(),
            done: 0,
            current: String::new(),
        };
        self.turn_queue = queue;
        self.active_turn = None;
    }

    pub fn start_turn(&mut self, agent_id: &str, agent_name: &str, index: usize) {
        self.active_turn = Some(agent_id.to_string());
        self.progress.current = agent_name.to_string();
        self.progress.done = index;
    }

    pub fn end_turn(&mut self, index: usize) {
        self.active_turn = None;
        self.progress.done = index + 1;
        self.progress.current.clear();
    }

    pub fn enter_voting(&mut self) -> Result<(), DomainError> {
        self.active_turn = None;
        self.transition(Phase::Voting)
    }

    /// Start the next round with a fresh turn queue
    pub fn next_round(&mut self, queue: Vec<String>) -> Result<(), DomainError> {
        self.transition(Phase::Discussion)?;
        self.current_round += 1;
        self.set_queue(queue);
        Ok(())
    }

    pub fn finish(&mut self) -> Result<(), DomainError> {
        self.transition(Phase::Finished)?;
        self.active_turn = None;
        self.paused = false;
        Ok(())
    }

    pub fn record_elimination(&mut self) {
        self.rounds_without_elimination = 0;
    }

    pub fn record_no_elimination(&mut self) {
        self.rounds_without_elimination += 1;
    }
}

/// Why a consultation ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum FinishReason {
    /// Too many consecutive rounds passed without an elimination
    StallLimit { rounds: u32 },
    /// Exactly one agent is left
    SoleSurvivor { agent_id: String, agent_name: String },
    NoActiveAgents,
}

impl FinishReason {
    pub fn message(&self) -> String {
        match self {
            FinishReason::StallLimit { .. } => {
                "Reached the limit of rounds without elimination; consultation finished.".to_string()
            }
            FinishReason::SoleSurvivor { agent_name, .. } => {
                format!("Consultation finished: adopting the answer of {}.", agent_name)
            }
            FinishReason::NoActiveAgents => "Consultation finished: no active agents remain.".to_string(),
        }
    }

    /// Agent that should write the final summary, if any
    pub fn preferred_agent(&self) -> Option<&str> {
        match self {
            FinishReason::SoleSurvivor { agent_id, .. } => Some(agent_id),
            _ => None,
        }
    }
}

/// Decide whether the consultation ends after a tally.
///
/// The stall cap is checked first, so it ends the consultation regardless of
/// how many agents are still active.
pub fn check_end_conditions(state: &WorkflowState, cap: u32, agents: &[Agent]) -> Option<FinishReason> {
    if state.rounds_without_elimination() >= cap {
        return Some(FinishReason::StallLimit {
            rounds: state.rounds_without_elimination(),
        });
    }
    let mut active = agents.iter().filter(|a| a.is_active());
    match (active.next(), active.next()) {
        (None, _) => Some(FinishReason::NoActiveAgents),
        (Some(agent), None) => Some(FinishReason::SoleSurvivor {
            agent_id: agent.id.clone(),
            agent_name: agent.name.clone(),
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panel(n: usize) -> Vec<Agent> {
        use crate::agent::entities::{Provider, ProviderConfig};
        (0..n)
            .map(|i| Agent::new(format!("a{}", i), format!("A{}", i), ProviderConfig::new(Provider::OpenAi, "m")))
            .collect()
    }

    #[test]
    fn test_end_conditions_continue() {
        let mut state = WorkflowState::new();
        state.begin_session(ids(&["a0", "a1"])).unwrap();
        assert_eq!(check_end_conditions(&state, 3, &panel(2)), None);
    }

    #[test]
    fn test_stall_cap_wins_over_active_count() {
        let mut state = WorkflowState::new();
        state.begin_session(ids(&["a0", "a1", "a2"])).unwrap();
        for _ in 0..3 {
            state.record_no_elimination();
        }
        assert_eq!(
            check_end_conditions(&state, 3, &panel(3)),
            Some(FinishReason::StallLimit { rounds: 3 })
        );
    }

    #[test]
    fn test_sole_survivor() {
        let state = WorkflowState::new();
        let mut agents = panel(3);
        agents[0].eliminate();
        agents[2].eliminate();
        let reason = check_end_conditions(&state, 3, &agents).unwrap();
        assert_eq!(reason.preferred_agent(), Some("a1"));
        assert!(reason.message().contains("A1"));
    }

    #[test]
    fn test_no_active_agents() {
        let state = WorkflowState::new();
        let mut agents = panel(1);
        agents[0].eliminate();
        let reason = check_end_conditions(&state, 3, &agents).unwrap();
        assert_eq!(reason, FinishReason::NoActiveAgents);
        assert_eq!(reason.preferred_agent(), None);
    }

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_full_cycle() {
        let mut state = WorkflowState::new();
        assert_eq!(state.phase(), Phase::Setup);

        state.begin_session(ids(&["a", "b"])).unwrap();
        assert_eq!(state.phase(), Phase::Discussion);
        assert_eq!(state.current_round(), 1);
        assert_eq!(state.progress().total, 2);

        state.enter_voting().unwrap();
        state.next_round(ids(&["b"])).unwrap();
        assert_eq!(state.current_round(), 2);
        assert_eq!(state.turn_queue(), ids(&["b"]).as_slice());

        state.enter_voting().unwrap();
        state.finish().unwrap();
        assert!(state.is_finished());
    }

    #[test]
    fn test_finished_is_terminal() {
        let mut state = WorkflowState::new();
        state.begin_session(ids(&["a"])).unwrap();
        state.enter_voting().unwrap();
        state.finish().unwrap();

        assert!(state.next_round(ids(&["a"])).is_err());
        assert!(state.enter_voting().is_err());
        assert_eq!(state.current_round(), 1);
        assert_eq!(state.turn_queue(), ids(&["a"]).as_slice());
    }

    #[test]
    fn test_cannot_skip_voting() {
        let mut state = WorkflowState::new();
        state.begin_session(ids(&["a"])).unwrap();
        assert!(state.finish().is_err());
        assert!(state.next_round(vec![]).is_err());
    }

    #[test]
    fn test_begin_session_rejected_mid_session() {
        let mut state = WorkflowState::new();
        state.begin_session(ids(&["a"])).unwrap();
        assert!(state.begin_session(ids(&["a"])).is_err());
    }

    #[test]
    fn test_restart_after_finish_resets_counters() {
        let mut state = WorkflowState::new();
        state.begin_session(ids(&["a"])).unwrap();
        state.record_no_elimination();
        state.enter_voting().unwrap();
        state.finish().unwrap();

        state.begin_session(ids(&["a", "b"])).unwrap();
        assert_eq!(state.current_round(), 1);
        assert_eq!(state.rounds_without_elimination(), 0);
    }

    #[test]
    fn test_turn_progress() {
        let mut state = WorkflowState::new();
        state.begin_session(ids(&["a", "b"])).unwrap();
        state.start_turn("a", "Dr. A", 0);
        assert_eq!(state.active_turn(), Some("a"));
        assert_eq!(state.progress().current, "Dr. A");
        state.end_turn(0);
        assert_eq!(state.active_turn(), None);
        assert_eq!(state.progress().done, 1);
    }

    #[test]
    fn test_elimination_counter() {
        let mut state = WorkflowState::new();
        state.record_no_elimination();
        state.record_no_elimination();
        assert_eq!(state.rounds_without_elimination(), 2);
        state.record_elimination();
        assert_eq!(state.rounds_without_elimination(), 0);
    }
}
