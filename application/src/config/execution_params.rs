//! Execution parameters for the consultation loop.
//!
//! [`ExecutionParams`] groups the timing knobs of
//! [`ConsultationEngine`](crate::use_cases::run_consultation::ConsultationEngine).
//! These are application-layer concerns, not domain policy.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Consultation loop timing.
///
/// | Knob | Default |
/// |------|---------|
/// | call timeout | 60 s |
/// | reveal | 1 char every 15 ms |
/// | gap between votes | 50 ms |
/// | pause before tally | 200 ms |
/// | knowledge entries per prompt | 5 |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionParams {
    /// Upper bound for every provider call
    pub call_timeout: Duration,
    /// Characters revealed to observers per step; 0 reveals the whole reply at once
    pub reveal_chunk_chars: usize,
    pub reveal_delay: Duration,
    pub vote_gap: Duration,
    pub tally_delay: Duration,
    pub knowledge_top_k: u32,
}

impl Default for ExecutionParams {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_secs(60),
            reveal_chunk_chars: 1,
            reveal_delay: Duration::from_millis(15),
            vote_gap: Duration::from_millis(50),
            tally_delay: Duration::from_millis(200),
            knowledge_top_k: 5,
        }
    }
}

impl ExecutionParams {
    /// Parameters with every delay removed
    pub fn without_delays() -> Self {
        Self {
            reveal_chunk_chars: 0,
            reveal_delay: Duration::ZERO,
            vote_gap: Duration::ZERO,
            tally_delay: Duration::ZERO,
            ..Self::default()
        }
    }

    // ==================== Builder Methods ====================

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub fn with_reveal(mut self, chunk_chars: usize, delay: Duration) -> Self {
        self.reveal_chunk_chars = chunk_chars;
        self.reveal_delay = delay;
        self
    }

    pub fn with_vote_gap(mut self, gap: Duration) -> Self {
        self.vote_gap = gap;
        self
    }

    pub fn with_knowledge_top_k(mut self, top_k: u32) -> Self {
        self.knowledge_top_k = top_k;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let params = ExecutionParams::default();
        assert_eq!(params.call_timeout, Duration::from_secs(60));
        assert_eq!(params.reveal_chunk_chars, 1);
        assert_eq!(params.reveal_delay, Duration::from_millis(15));
        assert_eq!(params.knowledge_top_k, 5);
    }

    #[test]
    fn test_without_delays_keeps_timeout() {
        let params = ExecutionParams::without_delays().with_call_timeout(Duration::from_secs(5));
        assert_eq!(params.reveal_delay, Duration::ZERO);
        assert_eq!(params.vote_gap, Duration::ZERO);
        assert_eq!(params.call_timeout, Duration::from_secs(5));
    }
}
