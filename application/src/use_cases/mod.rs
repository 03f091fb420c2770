//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod final_summary;
pub mod knowledge_base;
pub mod run_consultation;
pub(crate) mod shared;
