//! Core domain concepts shared across all subdomains.
//!
//! - [`error::DomainError`]: domain-level errors
//! - [`validation::ConfigIssue`]: structured configuration problems
//! - [`string::truncate`] and [`string::take_chars`] for UTF-8 safe excerpts

pub mod error;
pub mod string;
pub mod validation;
