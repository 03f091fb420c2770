//! Voting: parsing free-form vote responses, resolving targets, tallying

pub mod parsing;
pub mod record;
pub mod resolve;
pub mod tally;
