//! Error types for the assurance layer

use thiserror::Error;

/// Errors raised by the Model Assurance Layer
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AssuranceError {
    /// No attempt reached the failure budget within `max_attempts`
    #[error("Retry budget exhausted for '{signature}' after {attempts} attempts")]
    RetryBudgetExhausted {
        /// Call signature
        signature: String,
        /// Attempts consumed
        attempts: u32,
        /// Latency of every attempt, in order
        latency_trace: Vec<u64>,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
