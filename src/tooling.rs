//! Tooling
//!
//! The `folio` command-line interface and its text output.

pub mod cli;
pub mod format;

pub use cli::{Cli, CliContext, Commands};
