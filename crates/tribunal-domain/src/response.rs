//! Provider response module
//!
//! A `ProviderResponse` can only be built through [`ProviderResponse::new`],
//! which rejects out-of-range confidence and latency. Deserialization goes
//! through the same constructor. Bad data therefore fails at the boundary
//! instead of surfacing as a later check.

use crate::DomainError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One responder's answer to one prompt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "UncheckedResponse")]
pub struct ProviderResponse {
    model_id: String,
    content: String,
    confidence: f64,
    latency_ms: f64,
    tokens_used: u32,
    fingerprint: String,
    timestamp: u64,
    metadata: BTreeMap<String, String>,
}

/// Wire form of [`ProviderResponse`] before validation
#[derive(Deserialize)]
struct UncheckedResponse {
    model_id: String,
    content: String,
    confidence: f64,
    latency_ms: f64,
    tokens_used: u32,
    fingerprint: String,
    timestamp: u64,
    metadata: BTreeMap<String, String>,
}

impl TryFrom<UncheckedResponse> for ProviderResponse {
    type Error = DomainError;

    fn try_from(raw: UncheckedResponse) -> Result<Self, Self::Error> {
        let mut response = ProviderResponse::new(
            raw.model_id,
            raw.content,
            raw.confidence,
            raw.latency_ms,
            raw.tokens_used,
        )?
        .with_fingerprint(raw.fingerprint)
        .with_timestamp(raw.timestamp);
        response.metadata = raw.metadata;
        Ok(response)
    }
}

impl ProviderResponse {
    /// Create a validated response
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidConfidence`] when `confidence` is outside
    /// [0, 1] and [`DomainError::InvalidLatency`] when `latency_ms` is negative
    /// or not finite.
    ///
    /// # Examples
    ///
    /// ```
    /// use tribunal_domain::ProviderResponse;
    ///
    /// let ok = ProviderResponse::new("m1", "yes", 0.9, 12.0, 3);
    /// assert!(ok.is_ok());
    ///
    /// let bad = ProviderResponse::new("m1", "yes", 1.2, 12.0, 3);
    /// assert!(bad.is_err());
    /// ```
    pub fn new(
        model_id: impl Into<String>,
        content: impl Into<String>,
        confidence: f64,
        latency_ms: f64,
        tokens_used: u32,
    ) -> Result<Self, DomainError> {
        if !(0.0..=1.0).contains(&confidence) {
            return Err(DomainError::InvalidConfidence(confidence));
        }
        if !latency_ms.is_finite() || latency_ms < 0.0 {
            return Err(DomainError::InvalidLatency(latency_ms));
        }

        Ok(Self {
            model_id: model_id.into(),
            content: content.into(),
            confidence,
            latency_ms,
            tokens_used,
            fingerprint: String::new(),
            timestamp: 0,
            metadata: BTreeMap::new(),
        })
    }

    /// Attach a content fingerprint
    pub fn with_fingerprint(mut self, fingerprint: impl Into<String>) -> Self {
        self.fingerprint = fingerprint.into();
        self
    }

    /// Attach a logical timestamp
    pub fn with_timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Attach a metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Identifier of the model that produced this response
    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// Raw response text
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Self-reported confidence in [0, 1]
    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    /// Observed or synthesized latency
    pub fn latency_ms(&self) -> f64 {
        self.latency_ms
    }

    /// Tokens consumed by the call
    pub fn tokens_used(&self) -> u32 {
        self.tokens_used
    }

    /// SHA-256 fingerprint of the content (empty when not supplied)
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Logical timestamp of the call
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// Free-form metadata
    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    /// Content normalized for agreement comparison
    ///
    /// Agreement is plain string equality after trimming, lowercasing and
    /// dropping trailing punctuation.
    pub fn normalized_content(&self) -> String {
        normalize_answer(&self.content)
    }
}

/// Normalize an answer for string-equality agreement
pub fn normalize_answer(text: &str) -> String {
    text.trim()
        .trim_end_matches(|c: char| c == '.' || c == '!' || c == '?')
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
