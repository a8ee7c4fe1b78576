//! Model Assurance Layer
//!
//! Deterministic stand-in for real network calls. Everything here is a pure
//! function of the caller-supplied signature, memoized process-wide:
//!
//! - latency synthesis (`generate_latency`)
//! - SHA-256 fingerprinting (`fingerprint`)
//! - token estimation (`estimate_tokens`)
//! - bounded retry with a per-call attempt budget (`retry`)
//!
//! The memo tables are keyed and only ever cleared by [`ModelAssurance::reset`].

use crate::AssuranceError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

/// Configuration for the assurance layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssuranceConfig {
    /// Minimum synthesized latency (ms)
    pub base_latency_ms: u64,

    /// Width of the synthesized latency range (ms)
    pub latency_spread_ms: u64,

    /// Attempts below this index fail during simulated calls
    pub failure_budget: u32,

    /// Maximum simulated attempts per call
    pub max_attempts: u32,
}

impl Default for AssuranceConfig {
    fn default() -> Self {
        Self {
            base_latency_ms: 40,
            latency_spread_ms: 160,
            failure_budget: 0,
            max_attempts: 3,
        }
    }
}

impl AssuranceConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), AssuranceError> {
        if self.max_attempts == 0 {
            return Err(AssuranceError::Config(
                "max_attempts must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Outcome status of a retried call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetryStatus {
    /// An attempt succeeded
    Ok,
    /// Every attempt failed
    Failed,
}

/// Full trace of a retried call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryOutcome {
    /// Call signature
    pub signature: String,

    /// Final status
    pub status: RetryStatus,

    /// Attempts consumed
    pub attempts: u32,

    /// Latency of every attempt, in order
    pub latency_trace: Vec<u64>,
}

impl RetryOutcome {
    /// Sum of all attempt latencies
    pub fn total_latency_ms(&self) -> u64 {
        self.latency_trace.iter().sum()
    }

    /// Convert a failed outcome into a budget-exhausted error
    pub fn into_result(self) -> Result<Self, AssuranceError> {
        match self.status {
            RetryStatus::Ok => Ok(self),
            RetryStatus::Failed => Err(AssuranceError::RetryBudgetExhausted {
                signature: self.signature,
                attempts: self.attempts,
                latency_trace: self.latency_trace,
            }),
        }
    }
}

/// Process-wide assurance tables
///
/// # Examples
///
/// ```
/// use tribunal_llm::ModelAssurance;
///
/// let mal = ModelAssurance::default();
/// assert_eq!(mal.generate_latency("alpha"), mal.generate_latency("alpha"));
///
/// let outcome = mal.retry("alpha", 1, 3);
/// assert_eq!(outcome.attempts, 2);
/// ```
#[derive(Debug, Default)]
pub struct ModelAssurance {
    config: AssuranceConfig,
    latencies: Mutex<HashMap<String, u64>>,
    fingerprints: Mutex<HashMap<String, String>>,
    api_calls: AtomicU64,
}

impl ModelAssurance {
    /// Create a new assurance layer
    pub fn new(config: AssuranceConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &AssuranceConfig {
        &self.config
    }

    /// Deterministic latency for a signature, memoized
    pub fn generate_latency(&self, signature: &str) -> u64 {
        let mut latencies = self.latencies.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(latency) = latencies.get(signature) {
            return *latency;
        }

        let digest = Sha256::digest(signature.as_bytes());
        let mut seed = [0u8; 8];
        seed.copy_from_slice(&digest[..8]);
        let jitter = match self.config.latency_spread_ms {
            0 => 0,
            spread => u64::from_be_bytes(seed) % spread,
        };
        let latency = self.config.base_latency_ms + jitter;

        latencies.insert(signature.to_string(), latency);
        latency
    }

    /// Hex SHA-256 fingerprint of a payload, memoized
    pub fn fingerprint(&self, payload: &str) -> String {
        let mut fingerprints = self
            .fingerprints
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        fingerprints
            .entry(payload.to_string())
            .or_insert_with(|| sha256_hex(payload.as_bytes()))
            .clone()
    }

    /// Rough token count: one token per four characters, rounded up
    pub fn estimate_tokens(text: &str) -> u32 {
        let chars = text.chars().count() as u32;
        chars.div_ceil(4)
    }

    /// Simulate a call with a per-call attempt budget
    ///
    /// Attempts are numbered from 0. Every attempt consumes one api call;
    /// attempts below `failure_budget` fail and the first attempt at or
    /// above it succeeds. When `failure_budget >= max_attempts` the call
    /// fails after exactly `max_attempts` attempts and the trace is kept.
    pub fn retry(&self, signature: &str, failure_budget: u32, max_attempts: u32) -> RetryOutcome {
        let mut latency_trace = Vec::with_capacity(max_attempts as usize);

        for attempt in 0..max_attempts {
            self.api_calls.fetch_add(1, Ordering::SeqCst);
            latency_trace.push(self.generate_latency(&format!("{}#{}", signature, attempt)));

            if attempt >= failure_budget {
                return RetryOutcome {
                    signature: signature.to_string(),
                    status: RetryStatus::Ok,
                    attempts: attempt + 1,
                    latency_trace,
                };
            }
            tracing::debug!(signature, attempt, "simulated attempt failed");
        }

        RetryOutcome {
            signature: signature.to_string(),
            status: RetryStatus::Failed,
            attempts: max_attempts,
            latency_trace,
        }
    }

    /// Api calls consumed since creation or the last reset
    pub fn api_calls(&self) -> u64 {
        self.api_calls.load(Ordering::SeqCst)
    }

    /// Administrative reset of every memo table and counter
    pub fn reset(&self) {
        self.latencies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.fingerprints
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.api_calls.store(0, Ordering::SeqCst);
        tracing::info!("model assurance tables reset");
    }
}

/// Hex-encoded SHA-256 of raw bytes
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_latency_is_idempotent_and_bounded() {
        let mal = ModelAssurance::default();
        let first = mal.generate_latency("alpha::claim");
        assert_eq!(first, mal.generate_latency("alpha::claim"));
        assert!((40..200).contains(&first));
    }

    #[test]
    fn test_latency_is_reproducible_across_instances() {
        let a = ModelAssurance::default();
        let b = ModelAssurance::default();
        assert_eq!(a.generate_latency("sig"), b.generate_latency("sig"));
    }

    #[test]
    fn test_zero_spread_latency() {
        let mal = ModelAssurance::new(AssuranceConfig {
            base_latency_ms: 25,
            latency_spread_ms: 0,
            ..Default::default()
        });
        assert_eq!(mal.generate_latency("anything"), 25);
    }

    #[test]
    fn test_fingerprint_is_sha256() {
        let mal = ModelAssurance::default();
        assert_eq!(
            mal.fingerprint("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(mal.fingerprint("abc"), mal.fingerprint("abc"));
    }

    #[test]
    fn test_estimate_tokens() {
        assert_eq!(ModelAssurance::estimate_tokens(""), 0);
        assert_eq!(ModelAssurance::estimate_tokens("abcd"), 1);
        assert_eq!(ModelAssurance::estimate_tokens("abcde"), 2);
    }

    #[test]
    fn test_retry_failure_keeps_trace() {
        let mal = ModelAssurance::default();
        let outcome = mal.retry("beta", 5, 3);
        assert_eq!(outcome.status, RetryStatus::Failed);
        assert_eq!(outcome.attempts, 3);
        assert_eq!(outcome.latency_trace.len(), 3);
        assert_eq!(mal.api_calls(), 3);

        match outcome.into_result() {
            Err(AssuranceError::RetryBudgetExhausted { attempts, latency_trace, .. }) => {
                assert_eq!(attempts, 3);
                assert_eq!(latency_trace.len(), 3);
            }
            other => panic!("Expected RetryBudgetExhausted, got {:?}", other),
        }
    }

    #[test]
    fn test_reset_clears_counters() {
        let mal = ModelAssurance::default();
        mal.retry("gamma", 0, 1);
        assert_eq!(mal.api_calls(), 1);
        mal.reset();
        assert_eq!(mal.api_calls(), 0);
    }

    #[test]
    fn test_config_validation() {
        let config = AssuranceConfig {
            max_attempts: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        assert!(AssuranceConfig::default().validate().is_ok());
    }

    proptest! {
        /// Property: f < m succeeds after f+1 attempts, otherwise fails after m
        #[test]
        fn test_retry_attempt_arithmetic(f in 0u32..12, m in 0u32..12) {
            let mal = ModelAssurance::default();
            let outcome = mal.retry("prop", f, m);
            if f < m {
                prop_assert_eq!(outcome.status, RetryStatus::Ok);
                prop_assert_eq!(outcome.attempts, f + 1);
            } else {
                prop_assert_eq!(outcome.status, RetryStatus::Failed);
                prop_assert_eq!(outcome.attempts, m);
            }
            prop_assert_eq!(outcome.latency_trace.len() as u32, outcome.attempts);
            prop_assert_eq!(mal.api_calls(), outcome.attempts as u64);
        }

        /// Property: the trace is byte-for-byte reproducible
        #[test]
        fn test_retry_reproducible(sig in "[a-z]{1,12}", f in 0u32..5, m in 1u32..5) {
            let a = ModelAssurance::default().retry(&sig, f, m);
            let b = ModelAssurance::default().retry(&sig, f, m);
            prop_assert_eq!(a, b);
        }
    }
}
