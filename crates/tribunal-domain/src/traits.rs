//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the pipeline and the outside
//! world. Implementations live in other crates; the pipeline only ever sees
//! trait objects and never special-cases a vendor.

use crate::{KnowledgeSnippet, ProviderResponse, ResponderError};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

/// A model that can answer prompts
///
/// Implemented by the adapter layer (tribunal-llm)
#[async_trait]
pub trait Responder: Send + Sync {
    /// Stable identifier of this responder
    fn model_id(&self) -> &str;

    /// Reliability used when ranking witnesses, in [0, 1]
    fn reliability(&self) -> f64;

    /// Answer a prompt
    ///
    /// Per-call timeouts are the implementation's business.
    async fn generate(&self, prompt: &str) -> Result<ProviderResponse, ResponderError>;

    /// Whether the responder is currently usable
    async fn health_check(&self) -> bool;
}

/// Responders keyed by name; ordered so iteration is deterministic
pub type ResponderSet = BTreeMap<String, Arc<dyn Responder>>;

/// A source of external knowledge
///
/// Implementations must never fail past this boundary: every failure
/// degrades to an empty result.
#[async_trait]
pub trait EvidenceSource: Send + Sync {
    /// Name used in logs and snippets
    fn name(&self) -> &str;

    /// Look up at most `max_results` snippets for `query`
    async fn fetch(&self, query: &str, max_results: usize) -> Vec<KnowledgeSnippet>;
}
