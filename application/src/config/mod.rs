//! Application-level configuration.
//!
//! - [`ExecutionParams`]: consultation loop timing (call timeout, reveal pacing, vote gaps)

pub mod execution_params;

pub use execution_params::ExecutionParams;
