//! Error types for consensus configuration

use thiserror::Error;

/// Errors that can occur while configuring consensus scoring
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConsensusError {
    /// Grade table rows are not usable
    #[error("Invalid grade table: {0}")]
    InvalidGradeTable(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
