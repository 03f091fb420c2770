//! Discussion observer port
//!
//! Defines the interface for reporting progress during a consultation.

use consilium_domain::{Agent, Entry, FinalSummary, FinishReason, Phase, TallyOutcome, VoteRecord};

/// Callbacks fired by the consultation engine
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (console, web UI, etc.). Every method has a
/// no-op default.
pub trait DiscussionObserver: Send + Sync {
    /// Called when a round starts with its turn queue
    fn on_round_start(&self, _round: u32, _queue: &[String]) {}

    fn on_phase_change(&self, _phase: Phase) {}

    /// Called before an agent's provider call
    fn on_turn_start(&self, _agent: &Agent, _index: usize, _total: usize) {}

    /// Called for each revealed piece of an agent's reply
    fn on_reveal_chunk(&self, _agent: &Agent, _chunk: &str) {}

    fn on_turn_complete(&self, _agent: &Agent, _success: bool) {}

    /// Called for every entry appended to the history
    fn on_entry(&self, _entry: &Entry) {}

    fn on_vote(&self, _vote: &VoteRecord) {}

    fn on_tally(&self, _outcome: &TallyOutcome) {}

    fn on_pause_changed(&self, _paused: bool) {}

    fn on_finished(&self, _reason: &FinishReason) {}

    /// Called on every summary status change
    fn on_summary(&self, _summary: &FinalSummary) {}
}

/// No-op observer for when progress reporting is not needed
pub struct NoProgress;

impl DiscussionObserver for NoProgress {}
