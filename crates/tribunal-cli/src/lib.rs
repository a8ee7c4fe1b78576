//! Tribunal CLI library.
//!
//! Argument parsing, command execution and output formatting for the
//! `tribunal` binary.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;

pub use cli::{Cli, Command};
pub use config::{load_config, OutputFormat};
pub use error::{CliError, Result};
pub use output::Formatter;
