//! Consensus scoring configuration

use crate::{BucketCutoffs, ConsensusError, GradeTable};
use serde::{Deserialize, Serialize};

/// Component weights of the consensus score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConsensusWeights {
    /// Weight of agreement percentage
    pub agreement: f64,
    /// Weight of structural stability (Tier-2 score)
    pub stability: f64,
    /// Weight of evidence strength
    pub evidence: f64,
}

impl Default for ConsensusWeights {
    fn default() -> Self {
        Self {
            agreement: 0.30,
            stability: 0.25,
            evidence: 0.30,
        }
    }
}

/// Configuration for the consensus computer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsensusConfig {
    /// Component weights
    pub weights: ConsensusWeights,

    /// Points added when arbitration ran
    pub arbitration_bonus: f64,

    /// Points removed per unit of (dissent fraction × witness reliability)
    pub dissent_weight: f64,

    /// Grade rows
    pub grade_table: GradeTable,

    /// Qualitative bucket cut-offs
    pub buckets: BucketCutoffs,
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            weights: ConsensusWeights::default(),
            arbitration_bonus: 10.0,
            dissent_weight: 10.0,
            grade_table: GradeTable::default(),
            buckets: BucketCutoffs::default(),
        }
    }
}

impl ConsensusConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConsensusError> {
        let weights = [
            self.weights.agreement,
            self.weights.stability,
            self.weights.evidence,
        ];
        if weights.iter().any(|w| *w < 0.0 || !w.is_finite()) {
            return Err(ConsensusError::Config(
                "weights must be finite and non-negative".to_string(),
            ));
        }
        if self.arbitration_bonus < 0.0 || self.dissent_weight < 0.0 {
            return Err(ConsensusError::Config(
                "arbitration_bonus and dissent_weight must be non-negative".to_string(),
            ));
        }
        self.grade_table.validate()?;
        self.buckets.validate()
    }
}
