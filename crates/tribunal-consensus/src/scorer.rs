//! Weighted consensus score and grade

use crate::{dissent_fraction, Agreement, Bucket, ConsensusConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;
use tribunal_domain::{ConsensusResult, EvidencePacket, TierOneEntry, TierTwoResult, Witness};

/// Everything the score depends on
#[derive(Debug, Clone, Copy)]
pub struct ConsensusInputs<'a> {
    /// Tier-1 entries per model
    pub tier1: &'a BTreeMap<String, Vec<TierOneEntry>>,
    /// Tier-2 result, if the check ran
    pub tier2: Option<&'a TierTwoResult>,
    /// Evidence packet, if the evidence stage ran
    pub evidence: Option<&'a EvidencePacket>,
    /// Whether arbitration ran
    pub arbitrated: bool,
    /// Selected witness
    pub witness: &'a Witness,
}

impl ConsensusInputs<'_> {
    /// Evidence ran and did not call for escalation
    pub fn tier3_verified(&self) -> bool {
        self.evidence.is_some_and(EvidencePacket::is_verified)
    }
}

/// Weighted contributions making up the score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Agreement contribution
    pub agreement: f64,
    /// Stability contribution
    pub stability: f64,
    /// Evidence contribution
    pub evidence: f64,
    /// Arbitration bonus
    pub arbitration_bonus: f64,
    /// Witness dissent penalty
    pub dissent_penalty: f64,
}

impl ScoreBreakdown {
    /// Unclamped sum
    pub fn raw_total(&self) -> f64 {
        self.agreement + self.stability + self.evidence + self.arbitration_bonus
            - self.dissent_penalty
    }
}

/// Consensus result plus how it was reached
#[derive(Debug, Clone, PartialEq)]
pub struct ConsensusReport {
    /// The result recorded in the snapshot
    pub result: ConsensusResult,
    /// Qualitative bucket of the score
    pub bucket: Bucket,
    /// Weighted contributions
    pub breakdown: ScoreBreakdown,
    /// Whether Tier-3 evidence verified the claims
    pub tier3_verified: bool,
}

/// Combines stage outputs into a score and grade
#[derive(Debug, Clone, Default)]
pub struct ConsensusComputer {
    config: ConsensusConfig,
}

impl ConsensusComputer {
    /// Create a computer with the given configuration
    pub fn new(config: ConsensusConfig) -> Self {
        Self { config }
    }

    /// Get the configuration
    pub fn config(&self) -> &ConsensusConfig {
        &self.config
    }

    /// Score and grade one run
    pub fn compute(&self, inputs: &ConsensusInputs<'_>) -> ConsensusReport {
        let agreement = Agreement::measure(inputs.tier1);
        let weights = &self.config.weights;

        let stability = inputs.tier2.map_or(100.0, |t| t.score);
        let evidence = match inputs.evidence {
            Some(packet) => packet.evidence_density * 100.0,
            None => mean_score(inputs.tier1),
        };
        let dissent = dissent_fraction(inputs.witness, inputs.tier1);

        let breakdown = ScoreBreakdown {
            agreement: agreement.ratio() * 100.0 * weights.agreement,
            stability: stability * weights.stability,
            evidence: evidence * weights.evidence,
            arbitration_bonus: if inputs.arbitrated {
                self.config.arbitration_bonus
            } else {
                0.0
            },
            dissent_penalty: self.config.dissent_weight * dissent * inputs.witness.reliability,
        };
        let score = breakdown.raw_total().clamp(0.0, 100.0);

        let tier3_verified = inputs.tier3_verified();
        let bucket = self.config.buckets.bucket(score);
        let grade = bucket.limit(self.config.grade_table.grade(agreement.ratio(), tier3_verified));

        debug!(
            score,
            grade = %grade,
            bucket = %bucket,
            agreement = agreement.ratio(),
            tier3_verified,
            "consensus computed"
        );

        ConsensusReport {
            result: ConsensusResult {
                score,
                grade,
                agreement_count: agreement.agreement_count,
                total_responses: agreement.total_responses,
                contributing_models: agreement.contributing_models,
            },
            bucket,
            breakdown,
            tier3_verified,
        }
    }
}

fn mean_score(tier1: &BTreeMap<String, Vec<TierOneEntry>>) -> f64 {
    let scores: Vec<f64> = tier1.values().flatten().map(|e| e.score).collect();
    if scores.is_empty() {
        0.0
    } else {
        scores.iter().sum::<f64>() / scores.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tribunal_domain::{Grade, Label};

    fn tier1(models: usize, agreeing: usize, score: f64) -> BTreeMap<String, Vec<TierOneEntry>> {
        (0..models)
            .map(|i| {
                let answer = if i < agreeing { "yes" } else { "no" };
                let name = format!("model-{i:02}");
                let entry = TierOneEntry::new(&name, "claim", Label::True, score, answer).unwrap();
                (name, vec![entry])
            })
            .collect()
    }

    fn verified_packet() -> EvidencePacket {
        EvidencePacket::new(vec!["claim".to_string()], Vec::new(), 1.0, 0.4)
    }

    #[test]
    fn test_full_agreement_without_evidence_is_a() {
        let entries = tier1(2, 2, 90.0);
        let witness = Witness::new("model-00", 1.0).unwrap();
        let report = ConsensusComputer::default().compute(&ConsensusInputs {
            tier1: &entries,
            tier2: None,
            evidence: None,
            arbitrated: false,
            witness: &witness,
        });

        // 100×0.30 + 100×0.25 + 90×0.30
        assert!((report.result.score - 82.0).abs() < 1e-9);
        assert_eq!(report.result.grade, Grade::A);
        assert_eq!(report.bucket, Bucket::High);
        assert!(!report.tier3_verified);
        assert_eq!(report.result.contributing_models, vec!["model-00", "model-01"]);
    }

    #[test]
    fn test_verified_evidence_and_arbitration() {
        let entries = tier1(2, 2, 90.0);
        let witness = Witness::new("model-00", 1.0).unwrap();
        let packet = verified_packet();
        let tier2 = TierTwoResult::derive(Vec::new(), 1);
        let report = ConsensusComputer::default().compute(&ConsensusInputs {
            tier1: &entries,
            tier2: Some(&tier2),
            evidence: Some(&packet),
            arbitrated: true,
            witness: &witness,
        });

        assert!((report.result.score - 95.0).abs() < 1e-9);
        assert_eq!(report.result.grade, Grade::APlus);
        assert!(report.tier3_verified);
    }

    #[test]
    fn test_dissenting_witness_penalty() {
        let entries = tier1(3, 2, 90.0);
        let witness = Witness::new("model-02", 0.5).unwrap();
        let report = ConsensusComputer::default().compute(&ConsensusInputs {
            tier1: &entries,
            tier2: None,
            evidence: None,
            arbitrated: false,
            witness: &witness,
        });

        assert!((report.breakdown.dissent_penalty - 5.0).abs() < 1e-9);
        assert_eq!(report.result.agreement_count, 2);
        assert_eq!(report.result.grade, Grade::B);
    }

    #[test]
    fn test_low_score_caps_grade() {
        let entries = tier1(2, 2, 0.0);
        let witness = Witness::synthetic();
        let tier2 = TierTwoResult::derive(vec!["x".into(); 10], 10);
        let report = ConsensusComputer::default().compute(&ConsensusInputs {
            tier1: &entries,
            tier2: Some(&tier2),
            evidence: None,
            arbitrated: false,
            witness: &witness,
        });

        // 30 + 0 + 0: CRITICAL despite full agreement
        assert_eq!(report.bucket, Bucket::Critical);
        assert_eq!(report.result.grade, Grade::D);
    }

    #[test]
    fn test_empty_tier1() {
        let entries = BTreeMap::new();
        let witness = Witness::synthetic();
        let report = ConsensusComputer::default().compute(&ConsensusInputs {
            tier1: &entries,
            tier2: None,
            evidence: None,
            arbitrated: false,
            witness: &witness,
        });
        assert_eq!(report.result.total_responses, 0);
        assert_eq!(report.result.grade, Grade::F);
    }

    proptest! {
        /// Property: grade never drops as agreement rises, other inputs fixed
        #[test]
        fn test_grade_monotone_in_agreement(
            models in 1usize..12,
            score in 0.0f64..=100.0,
            arbitrated in any::<bool>(),
            with_evidence in any::<bool>(),
        ) {
            let computer = ConsensusComputer::default();
            let witness = Witness::synthetic();
            let packet = verified_packet();
            let evidence = with_evidence.then_some(&packet);

            let mut graded: Vec<(f64, Grade)> = Vec::new();
            for agreeing in 0..=models {
                let entries = tier1(models, agreeing, score);
                let report = computer.compute(&ConsensusInputs {
                    tier1: &entries,
                    tier2: None,
                    evidence,
                    arbitrated,
                    witness: &witness,
                });
                prop_assert!((0.0..=100.0).contains(&report.result.score));
                graded.push((report.result.agreement_ratio(), report.result.grade));
            }

            graded.sort_by(|a, b| a.0.total_cmp(&b.0));
            for pair in graded.windows(2) {
                prop_assert!(pair[1].1 >= pair[0].1, "{:?} then {:?}", pair[0], pair[1]);
            }
        }
    }
}
