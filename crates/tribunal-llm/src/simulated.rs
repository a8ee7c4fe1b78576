//! Simulated responder backed by the assurance layer
//!
//! Produces byte-for-byte reproducible responses: latency, confidence and
//! fingerprint are all derived from the `(model, prompt)` signature. Every
//! simulated responder with the same stance gives the same answer to the
//! same prompt, so a simulated ensemble agrees unless told otherwise.

use crate::ModelAssurance;
use async_trait::async_trait;
use std::sync::Arc;
use tribunal_domain::{ProviderResponse, Responder, ResponderError};

/// Answer given by default
pub const DEFAULT_STANCE: &str = "affirmed";

/// Deterministic responder for simulation mode
#[derive(Debug, Clone)]
pub struct SimulatedResponder {
    model_id: String,
    reliability: f64,
    stance: String,
    failure_budget: u32,
    max_attempts: u32,
    assurance: Arc<ModelAssurance>,
}

impl SimulatedResponder {
    /// Create a simulated responder using the assurance layer's retry budget
    pub fn new(model_id: impl Into<String>, assurance: Arc<ModelAssurance>) -> Self {
        let config = assurance.config().clone();
        Self {
            model_id: model_id.into(),
            reliability: 1.0,
            stance: DEFAULT_STANCE.to_string(),
            failure_budget: config.failure_budget,
            max_attempts: config.max_attempts,
            assurance,
        }
    }

    /// Set the reliability used for witness ranking (clamped into [0, 1])
    pub fn with_reliability(mut self, reliability: f64) -> Self {
        self.reliability = reliability.clamp(0.0, 1.0);
        self
    }

    /// Set the answer this responder gives
    pub fn with_stance(mut self, stance: impl Into<String>) -> Self {
        self.stance = stance.into();
        self
    }

    /// Override the per-call attempt budget
    pub fn with_retry_budget(mut self, failure_budget: u32, max_attempts: u32) -> Self {
        self.failure_budget = failure_budget;
        self.max_attempts = max_attempts;
        self
    }

    /// Confidence in [0.70, 0.99] derived from the signature
    fn confidence_for(&self, signature: &str) -> f64 {
        let fingerprint = self.assurance.fingerprint(signature);
        let byte = u8::from_str_radix(&fingerprint[..2], 16).unwrap_or(0);
        0.70 + (byte as f64 / 255.0) * 0.29
    }
}

#[async_trait]
impl Responder for SimulatedResponder {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn reliability(&self) -> f64 {
        self.reliability
    }

    async fn generate(&self, prompt: &str) -> Result<ProviderResponse, ResponderError> {
        let signature = format!("{}::{}", self.model_id, prompt);
        let outcome = self
            .assurance
            .retry(&signature, self.failure_budget, self.max_attempts)
            .into_result()
            .map_err(|e| {
                tracing::debug!(model = %self.model_id, error = %e, "simulated call failed");
                match e {
                    crate::AssuranceError::RetryBudgetExhausted { attempts, .. } => {
                        ResponderError::BudgetExhausted { attempts }
                    }
                    other => ResponderError::Other(other.to_string()),
                }
            })?;

        let content = self.stance.clone();
        let tokens = ModelAssurance::estimate_tokens(prompt) + ModelAssurance::estimate_tokens(&content);
        let response = ProviderResponse::new(
            self.model_id.clone(),
            content.clone(),
            self.confidence_for(&signature),
            outcome.total_latency_ms() as f64,
            tokens,
        )?
        .with_fingerprint(self.assurance.fingerprint(&content))
        .with_metadata("attempts", outcome.attempts.to_string());

        Ok(response)
    }

    async fn health_check(&self) -> bool {
        true
    }
}
