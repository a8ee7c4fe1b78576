//! State snapshot and canonical hashing
//!
//! A snapshot is persisted with its fields in declaration order and hashed
//! over a canonical view: every object's keys sorted recursively, no
//! whitespace. The timestamp is a caller-supplied logical clock value, so
//! identical runs hash identically on any machine.

use crate::SnapshotError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tribunal_domain::{
    ConsensusResult, EvidencePacket, ExecutionPlan, JudicialRecord, Premise, TierOneEntry,
    TierStage, TierTwoResult,
};
use tribunal_llm::sha256_hex;

/// Complete, immutable record of one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// Structured premise list
    pub psl: Vec<Premise>,

    /// Tier-1 entries per model
    pub tier1: BTreeMap<String, Vec<TierOneEntry>>,

    /// Tier-2 verdict, when the check ran
    pub tier2: Option<TierTwoResult>,

    /// Tier-3 evidence packet, when evidence was gathered
    pub reality_packet: Option<EvidencePacket>,

    /// Tier-4 arbitration record, when arbitration ran
    pub judicial: Option<JudicialRecord>,

    /// Final consensus
    pub consensus_score: ConsensusResult,

    /// Stages that ran, in order
    pub execution_plan: ExecutionPlan,

    /// Logical clock value supplied by the caller
    pub timestamp: u64,
}

impl StateSnapshot {
    /// Sorted-key, whitespace-free JSON
    pub fn canonical_json(&self) -> Result<String, SnapshotError> {
        let value = canonicalize(serde_json::to_value(self)?);
        Ok(serde_json::to_string(&value)?)
    }

    /// Hex SHA-256 of the canonical JSON
    pub fn digest(&self) -> Result<String, SnapshotError> {
        Ok(sha256_hex(self.canonical_json()?.as_bytes()))
    }

    /// One replay-log line, fields in declaration order
    pub fn to_json_line(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse and validate one replay-log line
    pub fn from_json_line(line: &str) -> Result<Self, SnapshotError> {
        let snapshot: Self = serde_json::from_str(line)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Reject malformed snapshots before they are persisted
    pub fn validate(&self) -> Result<(), SnapshotError> {
        if self.execution_plan.tier_path.first() != Some(&TierStage::Premises) {
            return Err(invalid("execution plan must start with premises"));
        }

        for (model, entries) in &self.tier1 {
            for entry in entries {
                if &entry.model_id != model {
                    return Err(invalid(format!(
                        "tier1 entry for '{}' filed under '{model}'",
                        entry.model_id
                    )));
                }
                if !(0.0..=100.0).contains(&entry.score) {
                    return Err(invalid(format!("tier1 score {} out of range", entry.score)));
                }
                if !self.psl.iter().any(|p| p.text == entry.claim) {
                    return Err(invalid(format!(
                        "tier1 claim '{}' not in premise list",
                        entry.claim
                    )));
                }
            }
        }

        if let Some(tier2) = &self.tier2 {
            if !(0.0..=100.0).contains(&tier2.score) {
                return Err(invalid(format!("tier2 score {} out of range", tier2.score)));
            }
            if !(0.0..=1.0).contains(&tier2.disagreement_rate) {
                return Err(invalid(format!(
                    "disagreement rate {} out of range",
                    tier2.disagreement_rate
                )));
            }
            if tier2.accepted != tier2.contradictions.is_empty() {
                return Err(invalid("tier2 accepted flag disagrees with contradictions"));
            }
        }

        if let Some(packet) = &self.reality_packet {
            if !(0.0..=1.0).contains(&packet.evidence_density) {
                return Err(invalid(format!(
                    "evidence density {} out of range",
                    packet.evidence_density
                )));
            }
        }

        if let Some(judicial) = &self.judicial {
            if !(0.0..=1.0).contains(&judicial.confidence) {
                return Err(invalid(format!(
                    "arbiter confidence {} out of range",
                    judicial.confidence
                )));
            }
        }

        let consensus = &self.consensus_score;
        if !(0.0..=100.0).contains(&consensus.score) {
            return Err(invalid(format!("consensus score {} out of range", consensus.score)));
        }
        if consensus.agreement_count > consensus.total_responses {
            return Err(invalid(format!(
                "agreement count {} exceeds total responses {}",
                consensus.agreement_count, consensus.total_responses
            )));
        }

        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> SnapshotError {
    SnapshotError::Invalid(message.into())
}

/// Rebuild every object with its keys inserted in sorted order
fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let sorted: Map<String, Value> = entries
                .into_iter()
                .map(|(k, v)| (k, canonicalize(v)))
                .collect();
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use proptest::prelude::*;
    use tribunal_domain::{ContradictionLikelihood, ExecutionPlanBuilder, Grade, Label};

    pub(crate) fn sample(claim: &str) -> StateSnapshot {
        let psl = vec![
            Premise::new(claim, Label::True),
            Premise::new("It never fails", Label::False),
        ];
        let tier1 = ["alpha", "beta"]
            .into_iter()
            .map(|model| {
                let entries = psl
                    .iter()
                    .map(|p| TierOneEntry::new(model, &p.text, p.label, 90.0, "affirmed").unwrap())
                    .collect();
                (model.to_string(), entries)
            })
            .collect();

        let mut plan = ExecutionPlanBuilder::new(ContradictionLikelihood::Normal, true);
        plan.record(TierStage::Premises);
        plan.record(TierStage::Ensemble);

        StateSnapshot {
            psl,
            tier1,
            tier2: None,
            reality_packet: None,
            judicial: None,
            consensus_score: ConsensusResult {
                score: 82.0,
                grade: Grade::A,
                agreement_count: 2,
                total_responses: 2,
                contributing_models: vec!["alpha".to_string(), "beta".to_string()],
            },
            execution_plan: plan.freeze(),
            timestamp: 7,
        }
    }

    #[test]
    fn test_persisted_key_order() {
        let line = sample("The sky is blue").to_json_line().unwrap();
        let positions: Vec<usize> = [
            "\"psl\"",
            "\"tier1\"",
            "\"tier2\"",
            "\"reality_packet\"",
            "\"judicial\"",
            "\"consensus_score\"",
            "\"execution_plan\"",
            "\"timestamp\"",
        ]
        .iter()
        .map(|key| line.find(key).unwrap())
        .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_canonical_json_sorts_keys() {
        let json = sample("The sky is blue").canonical_json().unwrap();
        assert!(json.starts_with("{\"consensus_score\":{\"agreement_count\":2,"));
        assert!(!json.contains('\n'));
    }

    #[test]
    fn test_digest_stable_and_hex() {
        let a = sample("The sky is blue").digest().unwrap();
        let b = sample("The sky is blue").digest().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_timestamp_is_hashed() {
        let a = sample("The sky is blue");
        let b = StateSnapshot {
            timestamp: 8,
            ..a.clone()
        };
        assert_ne!(a.digest().unwrap(), b.digest().unwrap());
    }

    #[test]
    fn test_json_line_roundtrip() {
        let snapshot = sample("The sky is blue");
        let line = snapshot.to_json_line().unwrap();
        let parsed = StateSnapshot::from_json_line(&line).unwrap();
        assert_eq!(parsed, snapshot);
        assert_eq!(parsed.digest().unwrap(), snapshot.digest().unwrap());
    }

    #[test]
    fn test_validate_rejects_malformed() {
        let mut snapshot = sample("The sky is blue");
        snapshot.consensus_score.agreement_count = 5;
        assert!(matches!(snapshot.validate(), Err(SnapshotError::Invalid(_))));

        let mut snapshot = sample("The sky is blue");
        snapshot.psl.remove(0);
        assert!(snapshot.validate().is_err());

        let mut snapshot = sample("The sky is blue");
        snapshot.execution_plan.tier_path.clear();
        assert!(snapshot.validate().is_err());

        let mut snapshot = sample("The sky is blue");
        let entries = snapshot.tier1.remove("beta").unwrap();
        snapshot.tier1.insert("gamma".to_string(), entries);
        assert!(snapshot.validate().is_err());

        let mut snapshot = sample("The sky is blue");
        snapshot.tier2 = Some(TierTwoResult {
            accepted: true,
            contradictions: vec!["x".to_string()],
            score: 90.0,
            disagreement_rate: 0.5,
        });
        assert!(snapshot.validate().is_err());
    }

    #[test]
    fn test_from_json_line_validates() {
        let mut snapshot = sample("The sky is blue");
        snapshot.consensus_score.score = 140.0;
        let line = serde_json::to_string(&snapshot).unwrap();
        assert!(matches!(
            StateSnapshot::from_json_line(&line),
            Err(SnapshotError::Invalid(_))
        ));
        assert!(matches!(
            StateSnapshot::from_json_line("{not json"),
            Err(SnapshotError::Serialization(_))
        ));
    }

    proptest! {
        /// Property: changing one claim's text changes the digest
        #[test]
        fn test_digest_sensitive_to_claim_text(a in "[a-z ]{1,24}", b in "[a-z ]{1,24}") {
            prop_assume!(a != b && a != "It never fails" && b != "It never fails");
            prop_assert_ne!(sample(&a).digest().unwrap(), sample(&b).digest().unwrap());
        }
    }
}
