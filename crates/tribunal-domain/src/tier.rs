//! Tier module - per-stage results and the execution plan

use crate::{DomainError, Label};
use serde::{Deserialize, Serialize};

/// One stage of the escalation ladder, as recorded in `tier_path`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierStage {
    /// Premise structuring
    Premises,

    /// Tier 1: cheap parallel ensemble
    Ensemble,

    /// Tier 2: pairwise contradiction check
    Contradiction,

    /// Tier 2 retry with narrowed assumptions
    NarrowedRetry,

    /// Tier 3: evidence gathering
    Evidence,

    /// Tier 4: expensive arbitration
    Arbitration,

    /// Reliable witness selection
    Witness,

    /// Consensus scoring and grading
    Consensus,

    /// Governance and prose synthesis
    Synthesis,
}

impl TierStage {
    /// Get the stage name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            TierStage::Premises => "premises",
            TierStage::Ensemble => "ensemble",
            TierStage::Contradiction => "contradiction",
            TierStage::NarrowedRetry => "narrowed_retry",
            TierStage::Evidence => "evidence",
            TierStage::Arbitration => "arbitration",
            TierStage::Witness => "witness",
            TierStage::Consensus => "consensus",
            TierStage::Synthesis => "synthesis",
        }
    }

    /// Escalation tier number (1-4) for ladder stages
    pub fn tier(&self) -> Option<u8> {
        match self {
            TierStage::Ensemble => Some(1),
            TierStage::Contradiction | TierStage::NarrowedRetry => Some(2),
            TierStage::Evidence => Some(3),
            TierStage::Arbitration => Some(4),
            _ => None,
        }
    }
}

/// Declared likelihood that the query contains contradictions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContradictionLikelihood {
    /// No reason to expect contradictions
    #[default]
    Normal,

    /// Caller expects contradictions; forces the Tier-2 check
    Elevated,
}

/// One scored (model, claim) pair from the Tier-1 ensemble
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierOneEntry {
    /// Responder that produced the entry
    pub model_id: String,

    /// Claim text the responder was asked about
    pub claim: String,

    /// Label of the claim
    pub label: Label,

    /// Score in [0, 100]
    pub score: f64,

    /// Normalized answer used for agreement
    pub answer: String,
}

impl TierOneEntry {
    /// Create a validated entry
    pub fn new(
        model_id: impl Into<String>,
        claim: impl Into<String>,
        label: Label,
        score: f64,
        answer: impl Into<String>,
    ) -> Result<Self, DomainError> {
        if !(0.0..=100.0).contains(&score) {
            return Err(DomainError::InvalidScore(score));
        }
        Ok(Self {
            model_id: model_id.into(),
            claim: claim.into(),
            label,
            score,
            answer: answer.into(),
        })
    }
}

/// Verdict of the Tier-2 contradiction check
///
/// Derived once through [`TierTwoResult::derive`] and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierTwoResult {
    /// True when no contradictions were recorded
    pub accepted: bool,

    /// Ordered, human-readable contradiction descriptions
    pub contradictions: Vec<String>,

    /// max(0, 100 - 10 * |contradictions| - 25 * disagreement_rate)
    pub score: f64,

    /// contradictions / comparisons, in [0, 1]
    pub disagreement_rate: f64,
}

impl TierTwoResult {
    /// Derive a result from the recorded contradictions and the number of comparisons
    ///
    /// # Examples
    ///
    /// ```
    /// use tribunal_domain::TierTwoResult;
    ///
    /// let result = TierTwoResult::derive(vec!["a vs b".into()], 3);
    /// assert!(!result.accepted);
    /// assert!((result.score - (100.0 - 10.0 - 25.0 / 3.0)).abs() < 1e-9);
    /// ```
    pub fn derive(contradictions: Vec<String>, comparisons: usize) -> Self {
        let disagreement_rate = if comparisons == 0 {
            0.0
        } else {
            (contradictions.len() as f64 / comparisons as f64).min(1.0)
        };
        let score =
            (100.0 - 10.0 * contradictions.len() as f64 - 25.0 * disagreement_rate).max(0.0);

        Self {
            accepted: contradictions.is_empty(),
            contradictions,
            score,
            disagreement_rate,
        }
    }
}

/// Which stages ran, and in what order
///
/// Only obtainable by freezing an [`ExecutionPlanBuilder`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionPlan {
    /// Stages in execution order
    pub tier_path: Vec<TierStage>,

    /// Declared contradiction likelihood
    pub contradiction_likelihood: ContradictionLikelihood,

    /// Whether responders were simulated
    pub simulation: bool,
}

impl ExecutionPlan {
    /// Whether a stage ran
    pub fn ran(&self, stage: TierStage) -> bool {
        self.tier_path.contains(&stage)
    }

    /// Highest escalation tier reached (0 when no ladder stage ran)
    pub fn highest_tier(&self) -> u8 {
        self.tier_path
            .iter()
            .filter_map(TierStage::tier)
            .max()
            .unwrap_or(0)
    }
}

/// Incrementally records stages for one run
#[derive(Debug, Clone, Default)]
pub struct ExecutionPlanBuilder {
    tier_path: Vec<TierStage>,
    contradiction_likelihood: ContradictionLikelihood,
    simulation: bool,
}

impl ExecutionPlanBuilder {
    /// Start a plan
    pub fn new(contradiction_likelihood: ContradictionLikelihood, simulation: bool) -> Self {
        Self {
            tier_path: Vec::new(),
            contradiction_likelihood,
            simulation,
        }
    }

    /// Declared contradiction likelihood
    pub fn contradiction_likelihood(&self) -> ContradictionLikelihood {
        self.contradiction_likelihood
    }

    /// Record that a stage ran
    pub fn record(&mut self, stage: TierStage) {
        self.tier_path.push(stage);
    }

    /// Whether a stage has been recorded so far
    pub fn has_run(&self, stage: TierStage) -> bool {
        self.tier_path.contains(&stage)
    }

    /// Freeze the plan for snapshotting
    pub fn freeze(self) -> ExecutionPlan {
        ExecutionPlan {
            tier_path: self.tier_path,
            contradiction_likelihood: self.contradiction_likelihood,
            simulation: self.simulation,
        }
    }
}
