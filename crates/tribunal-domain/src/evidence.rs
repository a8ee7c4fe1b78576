//! Evidence module - snippets returned by sources and the packet built from them

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One piece of external knowledge returned by an evidence source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeSnippet {
    /// Name of the source that produced the snippet
    pub source_name: String,

    /// Snippet text
    pub content: String,

    /// Source reliability in [0, 1]
    pub reliability: f64,

    /// Free-form category (encyclopedia, news, paper, ...)
    pub category: String,

    /// Link back to the source, when it has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Source-specific metadata
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl KnowledgeSnippet {
    /// Create a snippet; reliability is clamped into [0, 1]
    pub fn new(
        source_name: impl Into<String>,
        content: impl Into<String>,
        reliability: f64,
        category: impl Into<String>,
    ) -> Self {
        let reliability = if reliability.is_nan() {
            0.0
        } else {
            reliability.clamp(0.0, 1.0)
        };
        Self {
            source_name: source_name.into(),
            content: content.into(),
            reliability,
            category: category.into(),
            url: None,
            metadata: BTreeMap::new(),
        }
    }

    /// Attach a URL
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

/// Result of the evidence stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidencePacket {
    /// Claims with at least one hit, in claim order
    pub verified_facts: Vec<String>,

    /// Claims with no hit (or whose lookup failed), in claim order
    pub conflicts_detected: Vec<String>,

    /// Mean per-claim hit saturation, in [0, 1]
    pub evidence_density: f64,

    /// density below threshold, or any conflict
    pub escalation_required: bool,
}

impl EvidencePacket {
    /// Build a packet, deriving `escalation_required` from the density threshold
    pub fn new(
        verified_facts: Vec<String>,
        conflicts_detected: Vec<String>,
        evidence_density: f64,
        density_threshold: f64,
    ) -> Self {
        let evidence_density = evidence_density.clamp(0.0, 1.0);
        let escalation_required =
            evidence_density < density_threshold || !conflicts_detected.is_empty();
        Self {
            verified_facts,
            conflicts_detected,
            evidence_density,
            escalation_required,
        }
    }

    /// Whether every claim was verified and density cleared the threshold
    pub fn is_verified(&self) -> bool {
        !self.escalation_required
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escalation_on_low_density() {
        let packet = EvidencePacket::new(vec!["a".into()], Vec::new(), 0.33, 0.4);
        assert!(packet.escalation_required);
    }

    #[test]
    fn test_escalation_on_conflict() {
        let packet = EvidencePacket::new(vec!["a".into()], vec!["b".into()], 0.9, 0.4);
        assert!(packet.escalation_required);
    }

    #[test]
    fn test_verified_packet() {
        let packet = EvidencePacket::new(vec!["a".into()], Vec::new(), 0.67, 0.4);
        assert!(packet.is_verified());
    }

    #[test]
    fn test_snippet_reliability_clamped() {
        assert_eq!(KnowledgeSnippet::new("s", "c", 1.7, "news").reliability, 1.0);
        assert_eq!(KnowledgeSnippet::new("s", "c", f64::NAN, "news").reliability, 0.0);
    }
}
