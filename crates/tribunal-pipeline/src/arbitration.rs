//! Tier-4 arbitration and the heavy audit

use crate::PipelineError;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};
use tribunal_domain::{JudicialRecord, ProviderResponse, Responder};
use tribunal_ensemble::CallTelemetry;
use tribunal_llm::sha256_hex;

/// Single-call arbitration by the most expensive responder
pub struct Arbitrator {
    responder: Arc<dyn Responder>,
    audit_min_confidence: f64,
}

impl fmt::Debug for Arbitrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arbitrator")
            .field("responder", &self.responder.model_id())
            .field("audit_min_confidence", &self.audit_min_confidence)
            .finish()
    }
}

impl Arbitrator {
    /// Create an arbitrator around `responder`
    pub fn new(responder: Arc<dyn Responder>, audit_min_confidence: f64) -> Self {
        Self {
            responder,
            audit_min_confidence,
        }
    }

    /// Identifier of the arbiter
    pub fn model_id(&self) -> &str {
        self.responder.model_id()
    }

    /// Ask the arbiter to settle the query, listing the unverified claims
    ///
    /// Makes exactly one call; a failed call is an error.
    pub async fn arbitrate(
        &self,
        query: &str,
        conflicts: &[String],
    ) -> Result<(JudicialRecord, CallTelemetry), PipelineError> {
        let prompt = arbitration_prompt(query, conflicts);
        let response = self
            .responder
            .generate(&prompt)
            .await
            .map_err(PipelineError::Arbitration)?;

        let audit_passed = self.heavy_audit(&response);
        if audit_passed {
            info!(
                arbiter = %response.model_id(),
                confidence = response.confidence(),
                "arbitration complete"
            );
        } else {
            warn!(
                arbiter = %response.model_id(),
                confidence = response.confidence(),
                "arbitration failed heavy audit"
            );
        }

        let telemetry = CallTelemetry {
            model_id: response.model_id().to_string(),
            claim: query.to_string(),
            latency_ms: response.latency_ms(),
            tokens_used: response.tokens_used(),
        };
        let record = JudicialRecord {
            model_id: response.model_id().to_string(),
            verdict: response.content().trim().to_string(),
            confidence: response.confidence(),
            audit_passed,
        };
        Ok((record, telemetry))
    }

    /// Re-check the arbiter's answer without another call
    pub fn heavy_audit(&self, response: &ProviderResponse) -> bool {
        let content = response.content();
        let fingerprint = response.fingerprint();
        let fingerprint_ok =
            fingerprint.is_empty() || fingerprint == sha256_hex(content.as_bytes());

        response.confidence() >= self.audit_min_confidence
            && !content.trim().is_empty()
            && fingerprint_ok
    }
}

fn arbitration_prompt(query: &str, conflicts: &[String]) -> String {
    let mut prompt = format!("Arbitrate the query: {query}");
    if !conflicts.is_empty() {
        prompt.push_str("\nUnverified claims:");
        for conflict in conflicts {
            prompt.push_str("\n- ");
            prompt.push_str(conflict);
        }
    }
    prompt
}
