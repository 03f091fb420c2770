//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod agent_gateway;
pub mod conversation_logger;
pub mod knowledge_source;
pub mod kv_store;
pub mod progress;
