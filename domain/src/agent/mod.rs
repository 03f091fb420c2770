//! Agent domain.
//!
//! - [`entities::Agent`]: a panel member with provider credentials
//! - [`entities::ProviderConfig`]: which provider/model answers for the agent

pub mod entities;
