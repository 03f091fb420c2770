//! Presentation layer for consilium
//!
//! This crate contains CLI definitions, output formatters,
//! progress reporters, and interactive run control.

pub mod cli;
pub mod control;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use cli::commands::{Cli, Command, ConfigCommand, ConsultArgs, KbCommand, ModelsArgs, OutputFormat};
pub use control::{ControlCommand, RunControl};
pub use output::console::ConsoleFormatter;
pub use output::report::ConsultationReport;
pub use progress::reporter::{ProgressReporter, SimpleProgress};
