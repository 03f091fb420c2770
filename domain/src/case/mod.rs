//! Case domain.
//!
//! - [`entities::Case`]: the patient record under discussion
//! - [`entities::LinkedCase`]: summaries of prior consultations

pub mod entities;
