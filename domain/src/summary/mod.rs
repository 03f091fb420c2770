//! Final summary domain

pub mod entities;
