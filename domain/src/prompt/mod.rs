//! Prompt domain
//!
//! Templates for discussion turns, votes and the final summary, plus the
//! rendering of history into provider messages and retrieval queries.

pub mod context;
mod template;

pub use context::{ProviderMessage, Role};
pub use template::{PromptBundle, PromptContext, PromptTemplate};
