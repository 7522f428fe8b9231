//! Tooling
//!
//! Command-line front end: argument parsing, command dispatch and the text
//! rendering of results.

pub mod cli;
pub mod format;

pub use cli::{Cli, CliContext, CommandOutput, Commands};
