//! Evidence density estimation

use crate::EvidenceConfig;
use std::sync::Arc;
use tracing::{debug, info, warn};
use tribunal_domain::{EvidencePacket, EvidenceSource, KnowledgeSnippet, Premise};

/// Multi-source evidence engine
#[derive(Clone, Default)]
pub struct EvidenceEngine {
    config: EvidenceConfig,
    sources: Vec<Arc<dyn EvidenceSource>>,
}

impl std::fmt::Debug for EvidenceEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.sources.iter().map(|s| s.name()).collect();
        f.debug_struct("EvidenceEngine")
            .field("config", &self.config)
            .field("sources", &names)
            .finish()
    }
}

impl EvidenceEngine {
    /// Create an engine with no sources
    pub fn new(config: EvidenceConfig) -> Self {
        Self {
            config,
            sources: Vec::new(),
        }
    }

    /// Register a source
    pub fn with_source(mut self, source: Arc<dyn EvidenceSource>) -> Self {
        self.sources.push(source);
        self
    }

    /// Register a source in place
    pub fn add_source(&mut self, source: Arc<dyn EvidenceSource>) {
        self.sources.push(source);
    }

    /// Get the configuration
    pub fn config(&self) -> &EvidenceConfig {
        &self.config
    }

    /// Number of registered sources
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Look up every claim and build the evidence packet
    pub async fn gather(&self, claims: &[Premise]) -> EvidencePacket {
        let max_results = self.config.max_results.max(1);
        let mut verified = Vec::new();
        let mut conflicts = Vec::new();
        let mut saturation = 0.0;

        for claim in claims {
            let hits = self.lookup(&claim.text, max_results).await;
            saturation += (hits.len() as f64 / max_results as f64).min(1.0);
            if hits.is_empty() {
                debug!(claim = %claim.text, "no evidence found");
                conflicts.push(claim.text.clone());
            } else {
                debug!(claim = %claim.text, hits = hits.len(), "claim verified");
                verified.push(claim.text.clone());
            }
        }

        let density = if claims.is_empty() {
            0.0
        } else {
            saturation / claims.len() as f64
        };
        let packet = EvidencePacket::new(verified, conflicts, density, self.config.density_threshold);

        info!(
            claims = claims.len(),
            verified = packet.verified_facts.len(),
            conflicts = packet.conflicts_detected.len(),
            density = packet.evidence_density,
            escalation_required = packet.escalation_required,
            "evidence gathered"
        );
        packet
    }

    /// Collect up to `max_results` hits for one claim across all sources
    ///
    /// Each fetch runs in its own task under the lookup timeout; timeouts
    /// and panics count as zero hits.
    async fn lookup(&self, query: &str, max_results: usize) -> Vec<KnowledgeSnippet> {
        let mut hits = Vec::new();

        for source in &self.sources {
            if hits.len() >= max_results {
                break;
            }

            let source = Arc::clone(source);
            let name = source.name().to_string();
            let query = query.to_string();
            let timeout = self.config.lookup_timeout();
            let remaining = max_results - hits.len();

            let task = tokio::spawn(async move {
                tokio::time::timeout(timeout, source.fetch(&query, remaining)).await
            });

            match task.await {
                Ok(Ok(snippets)) => hits.extend(snippets.into_iter().take(remaining)),
                Ok(Err(_)) => warn!(source = %name, "evidence lookup timed out"),
                Err(e) => warn!(source = %name, error = %e, "evidence source failed"),
            }
        }

        hits
    }
}
