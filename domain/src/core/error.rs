//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Case is missing a patient name")]
    MissingPatientName,

    #[error("Case is missing the current problem")]
    MissingProblem,

    #[error("No agents configured for the consultation")]
    NoAgents,

    #[error("Unknown agent: {0}")]
    UnknownAgent(String),

    #[error("Invalid setting: {0}")]
    InvalidSetting(String),

    #[error("Invalid phase transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },
}

impl DomainError {
    /// Whether this error comes from an incomplete case record
    pub fn is_case_error(&self) -> bool {
        matches!(
            self,
            DomainError::MissingPatientName | DomainError::MissingProblem
        )
    }
}
