//! Discussion domain.
//!
//! - [`history::DiscussionHistory`]: the append-only transcript
//! - [`workflow::WorkflowState`]: phase, round and turn bookkeeping
//! - [`turn_order`]: per-round speaker ordering
//! - [`settings::ConsultationSettings`]: prompts, order and stall cap

pub mod history;
pub mod settings;
pub mod turn_order;
pub mod workflow;
