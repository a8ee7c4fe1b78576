//! Error types for ensemble execution

use thiserror::Error;
use tribunal_domain::DomainError;

/// Errors that can occur during concurrent execution
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExecutorError {
    /// More responders failed than the error budget tolerates
    #[error(
        "Error budget exceeded: {failures}/{total} responders failed (budget {budget}): {}",
        describe_failures(.failed)
    )]
    BudgetExceeded {
        /// Number of failed calls
        failures: usize,
        /// Number of calls in the batch
        total: usize,
        /// Tolerated failure fraction
        budget: f64,
        /// (responder, error message) for every failure, sorted by responder
        failed: Vec<(String, String)>,
    },

    /// Error budget outside [0, 1]
    #[error("Invalid error budget: {0} (must be within [0, 1])")]
    InvalidBudget(f64),

    /// A response could not be turned into a valid entry
    #[error(transparent)]
    Domain(#[from] DomainError),
}

fn describe_failures(failed: &[(String, String)]) -> String {
    failed
        .iter()
        .map(|(name, error)| format!("{name} ({error})"))
        .collect::<Vec<_>>()
        .join(", ")
}
