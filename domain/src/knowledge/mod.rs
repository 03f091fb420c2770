//! Knowledge domain
//!
//! Reference documents, their sentence-aligned chunks, and the pure scoring
//! used by hybrid (lexical + vector) retrieval.

pub mod chunker;
pub mod config;
pub mod entities;
pub mod ranking;
pub mod similarity;
