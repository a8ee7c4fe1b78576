//! Tier-1 ensemble: every responder, every claim, cached per claim set

use crate::{ExecutorError, SafeExecutor};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{debug, info};
use tribunal_cache::{CacheConfig, CacheCounters, SwrCache};
use tribunal_domain::{Premise, ResponderSet, TierOneEntry};
use tribunal_premise::fingerprint_claims;

/// Prefix of the prompt sent for each claim
pub const CLAIM_PROMPT_PREFIX: &str = "Assess the claim: ";

/// Latency and token usage of one responder call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallTelemetry {
    /// Responder that answered
    pub model_id: String,
    /// Claim it answered
    pub claim: String,
    /// Reported latency (ms)
    pub latency_ms: f64,
    /// Reported token usage
    pub tokens_used: u32,
}

/// Outcome of one Tier-1 pass over a claim set
#[derive(Debug, Clone, PartialEq)]
pub struct TierOneBatch {
    /// model_id → entries in claim order
    pub entries: BTreeMap<String, Vec<TierOneEntry>>,

    /// One record per successful call, ordered by claim then model
    pub telemetry: Vec<CallTelemetry>,

    /// Claims on which the responders' answers differ
    pub disagreements: usize,

    /// Mean responder confidence, `None` when nobody was asked anything
    pub mean_confidence: Option<f64>,
}

impl TierOneBatch {
    /// Responders with at least one entry
    pub fn responders(&self) -> usize {
        self.entries.len()
    }

    /// Mean entry score across every model and claim (0 when empty)
    pub fn mean_score(&self) -> f64 {
        let scores: Vec<f64> = self.entries.values().flatten().map(|e| e.score).collect();
        if scores.is_empty() {
            0.0
        } else {
            scores.iter().sum::<f64>() / scores.len() as f64
        }
    }
}

/// First-pass ensemble over a structured claim set
#[derive(Debug)]
pub struct TierOneEnsemble {
    executor: SafeExecutor,
    cache: Arc<SwrCache<String, Arc<TierOneBatch>>>,
}

impl TierOneEnsemble {
    /// Create an ensemble with its own batch cache
    pub fn new(executor: SafeExecutor, cache_config: CacheConfig) -> Self {
        Self {
            executor,
            cache: SwrCache::new(cache_config),
        }
    }

    /// Run (or reuse) the batch for `claims` across `responders`
    ///
    /// The cache key combines the claim-set fingerprint with the responder
    /// names, so the same input against the same ensemble is executed once.
    /// Expired batches are purged first.
    pub async fn run(
        &self,
        claims: Arc<Vec<Premise>>,
        responders: &ResponderSet,
    ) -> Result<Arc<TierOneBatch>, ExecutorError> {
        self.cache.purge_expired();

        let names: Vec<&str> = responders.keys().map(String::as_str).collect();
        let key = format!("{}:{}", fingerprint_claims(&claims), names.join(","));

        let executor = self.executor;
        let responders = responders.clone();
        self.cache
            .get_or_refresh(key, move || async move {
                execute_batch(executor, &claims, &responders)
                    .await
                    .map(Arc::new)
            })
            .await
    }

    /// Batch cache counters
    pub fn cache_counters(&self) -> CacheCounters {
        self.cache.counters()
    }

    /// Batches currently held, expired ones included
    pub fn cached_batches(&self) -> usize {
        self.cache.len()
    }

    /// Administrative reset of the batch cache
    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}

async fn execute_batch(
    executor: SafeExecutor,
    claims: &[Premise],
    responders: &ResponderSet,
) -> Result<TierOneBatch, ExecutorError> {
    let mut entries: BTreeMap<String, Vec<TierOneEntry>> = BTreeMap::new();
    let mut telemetry = Vec::new();
    let mut confidences = Vec::new();
    let mut disagreements = 0;

    for claim in claims {
        let prompt = format!("{}{}", CLAIM_PROMPT_PREFIX, claim.text);
        let mut results = executor.execute(responders, &prompt).await?;
        results.sort_by(|a, b| a.0.cmp(&b.0));

        let mut answers = BTreeSet::new();
        for (name, response) in results {
            let answer = response.normalized_content();
            answers.insert(answer.clone());
            confidences.push(response.confidence());
            telemetry.push(CallTelemetry {
                model_id: name.clone(),
                claim: claim.text.clone(),
                latency_ms: response.latency_ms(),
                tokens_used: response.tokens_used(),
            });

            let entry = TierOneEntry::new(
                name.clone(),
                claim.text.clone(),
                claim.label,
                response.confidence() * 100.0,
                answer,
            )?;
            entries.entry(name).or_default().push(entry);
        }

        if answers.len() > 1 {
            debug!(claim = %claim.text, answers = answers.len(), "responders disagree");
            disagreements += 1;
        }
    }

    let mean_confidence = if confidences.is_empty() {
        None
    } else {
        Some(confidences.iter().sum::<f64>() / confidences.len() as f64)
    };

    info!(
        claims = claims.len(),
        responders = entries.len(),
        disagreements,
        "tier-1 batch executed"
    );

    Ok(TierOneBatch {
        entries,
        telemetry,
        disagreements,
        mean_confidence,
    })
}
