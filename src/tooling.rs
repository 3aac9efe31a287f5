//! Tooling & Integration Layer
//!
//! Command-line entry points and output formatting.

pub mod cli;
pub mod format;

pub use cli::{Action, Cli, CliContext, ExecutionReport, OutputFormat};
