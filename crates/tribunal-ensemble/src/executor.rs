//! Concurrent responder execution under an error budget

use crate::ExecutorError;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, warn};
use tribunal_domain::{ProviderResponse, ResponderError, ResponderSet};

/// Runs every responder in a set concurrently and gates on the failure ratio
///
/// Results are collected as they complete. Once every call has finished,
/// a failure ratio above the budget fails the whole batch; otherwise the
/// successful subset is returned.
///
/// # Examples
///
/// ```
/// use tribunal_ensemble::SafeExecutor;
///
/// assert!(SafeExecutor::new(0.5).is_ok());
/// assert!(SafeExecutor::new(1.5).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SafeExecutor {
    error_budget: f64,
}

impl SafeExecutor {
    /// Create an executor tolerating up to `error_budget` failed calls (fraction)
    pub fn new(error_budget: f64) -> Result<Self, ExecutorError> {
        if !(0.0..=1.0).contains(&error_budget) {
            return Err(ExecutorError::InvalidBudget(error_budget));
        }
        Ok(Self { error_budget })
    }

    /// Tolerated failure fraction
    pub fn error_budget(&self) -> f64 {
        self.error_budget
    }

    /// Send `prompt` to every responder and collect `(name, response)` pairs
    ///
    /// An empty responder set yields an empty result. The order of the
    /// returned pairs is completion order.
    pub async fn execute(
        &self,
        responders: &ResponderSet,
        prompt: &str,
    ) -> Result<Vec<(String, ProviderResponse)>, ExecutorError> {
        let total = responders.len();
        if total == 0 {
            return Ok(Vec::new());
        }

        let prompt: Arc<str> = Arc::from(prompt);
        let mut join_set = JoinSet::new();
        for (name, responder) in responders {
            let name = name.clone();
            let responder = Arc::clone(responder);
            let prompt = Arc::clone(&prompt);
            join_set.spawn(async move {
                let result = responder.generate(&prompt).await;
                (name, result)
            });
        }

        let mut successes = Vec::with_capacity(total);
        let mut failed = Vec::new();
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((name, Ok(response))) => successes.push((name, response)),
                Ok((name, Err(e))) => {
                    debug!(model = %name, error = %e, "responder call failed");
                    failed.push((name, e.to_string()));
                }
                Err(e) => {
                    warn!(error = %e, "responder task panicked");
                    failed.push((
                        "<panicked>".to_string(),
                        ResponderError::Other(e.to_string()).to_string(),
                    ));
                }
            }
        }

        let failures = failed.len();
        if failures as f64 / total as f64 > self.error_budget {
            failed.sort();
            warn!(failures, total, budget = self.error_budget, "error budget exceeded, discarding batch");
            return Err(ExecutorError::BudgetExceeded {
                failures,
                total,
                budget: self.error_budget,
                failed,
            });
        }

        debug!(successes = successes.len(), failures, total, "batch complete");
        Ok(successes)
    }
}
