//! Error types for the validator

use thiserror::Error;

/// Errors that can occur during contradiction detection
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidatorError {
    /// Embedding dimensions disagree
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected vector length
        expected: usize,
        /// Actual vector length
        actual: usize,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
