//! Serializable snapshot of a consultation

use consilium_application::{AgentGateway, ConsultationEngine};
use consilium_domain::{Agent, Case, Entry, FinalSummary, FinishReason, LinkedCase, VoteRecord};
use serde::Serialize;

/// Everything a formatter needs to render a consultation
#[derive(Debug, Clone, Serialize)]
pub struct ConsultationReport {
    pub consultation_name: String,
    pub case: Case,
    pub linked_cases: Vec<LinkedCase>,
    pub agents: Vec<Agent>,
    pub rounds: u32,
    /// `None` when the run was cancelled before finishing
    pub finish_reason: Option<FinishReason>,
    pub history: Vec<Entry>,
    pub summary: FinalSummary,
}

impl ConsultationReport {
    /// Snapshot the engine state after a run
    pub fn capture<G: AgentGateway + 'static>(
        engine: &ConsultationEngine<G>,
        finish_reason: Option<FinishReason>,
    ) -> Self {
        Self {
            consultation_name: engine.consultation_name().to_string(),
            case: engine.case().clone(),
            linked_cases: engine.linked_cases().to_vec(),
            agents: engine.agents().to_vec(),
            rounds: engine.workflow().current_round(),
            finish_reason,
            history: engine.history().settled().cloned().collect(),
            summary: engine.summary().clone(),
        }
    }

    pub fn votes(&self) -> impl Iterator<Item = &VoteRecord> {
        self.history.iter().filter_map(|entry| match entry {
            Entry::VoteDetail(vote) => Some(vote),
            _ => None,
        })
    }

    pub fn survivors(&self) -> impl Iterator<Item = &Agent> {
        self.agents.iter().filter(|a| a.is_active())
    }
}
