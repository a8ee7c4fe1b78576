//! Error types for the domain layer

use thiserror::Error;

/// Construction-time invariant violations
///
/// Raised at the boundary so that out-of-range data never enters the pipeline.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Confidence outside [0, 1] (or not a number)
    #[error("Invalid confidence {0}: must be within [0.0, 1.0]")]
    InvalidConfidence(f64),

    /// Negative or non-finite latency
    #[error("Invalid latency {0}ms: must be a finite, non-negative value")]
    InvalidLatency(f64),

    /// Score outside [0, 100]
    #[error("Invalid score {0}: must be within [0.0, 100.0]")]
    InvalidScore(f64),

    /// Reliability outside [0, 1]
    #[error("Invalid reliability {0}: must be within [0.0, 1.0]")]
    InvalidReliability(f64),
}

/// Errors a responder may signal from `generate`
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResponderError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// The responder answered with something unusable
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The responder ran out of attempts
    #[error("Retry budget exhausted after {attempts} attempts")]
    BudgetExhausted {
        /// Attempts consumed before giving up
        attempts: u32,
    },

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// The response violated a construction invariant
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Generic error
    #[error("Responder error: {0}")]
    Other(String),
}
