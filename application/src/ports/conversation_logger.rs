//! Port for structured conversation logging.
//!
//! Defines the [`ConversationLogger`] trait for recording consultation events
//! (turns, votes, tallies, summaries) to a structured log.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostic messages, while this port captures the
//! consultation transcript in a machine-readable format (JSONL).

use serde_json::Value;

/// A structured consultation event.
///
/// The adapter stamps each event with a UTC timestamp when it is written.
#[derive(Debug, Clone)]
pub struct ConversationEvent {
    /// Event type identifier (e.g. "turn_completed", "vote_cast", "tally").
    pub event_type: &'static str,
    pub payload: Value,
}

impl ConversationEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for logging consultation events.
///
/// `log` is synchronous and infallible; adapters swallow write failures so a
/// broken log file never interrupts a consultation.
pub trait ConversationLogger: Send + Sync {
    fn log(&self, event: ConversationEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoConversationLogger;

impl ConversationLogger for NoConversationLogger {
    fn log(&self, _event: ConversationEvent) {}
}
