//! Consensus module - witness, grade and adjudication records

use crate::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A responder selected post-hoc to challenge the consensus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Witness {
    /// Responder name
    pub name: String,

    /// Reliability in [0, 1]
    pub reliability: f64,
}

impl Witness {
    /// Name of the fallback witness used when there are no candidates
    pub const SYNTHETIC: &'static str = "synthetic";

    /// Create a validated witness
    pub fn new(name: impl Into<String>, reliability: f64) -> Result<Self, DomainError> {
        if !(0.0..=1.0).contains(&reliability) {
            return Err(DomainError::InvalidReliability(reliability));
        }
        Ok(Self {
            name: name.into(),
            reliability,
        })
    }

    /// The fixed witness returned for an empty candidate list
    pub fn synthetic() -> Self {
        Self {
            name: Self::SYNTHETIC.to_string(),
            reliability: 1.0,
        }
    }

    /// Whether this is the synthetic fallback
    pub fn is_synthetic(&self) -> bool {
        self.name == Self::SYNTHETIC
    }
}

/// Letter grade, ordered from worst to best
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Grade {
    /// Very low agreement
    F,
    /// Low agreement
    D,
    /// Mid agreement
    C,
    /// Two-thirds agreement
    B,
    /// Strong agreement, evidence-verified
    #[serde(rename = "B+")]
    BPlus,
    /// Full agreement
    A,
    /// Full agreement, evidence-verified
    #[serde(rename = "A+")]
    APlus,
}

impl Grade {
    /// Get the grade as displayed
    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::BPlus => "B+",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }

    /// Parse a displayed grade
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "A+" => Some(Grade::APlus),
            "A" => Some(Grade::A),
            "B+" => Some(Grade::BPlus),
            "B" => Some(Grade::B),
            "C" => Some(Grade::C),
            "D" => Some(Grade::D),
            "F" => Some(Grade::F),
            _ => None,
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final adjudicated score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusResult {
    /// Weighted score in [0, 100]
    pub score: f64,

    /// Letter grade
    pub grade: Grade,

    /// Responders agreeing with the majority answer
    pub agreement_count: usize,

    /// Responders that answered
    pub total_responses: usize,

    /// Names of agreeing responders, sorted
    pub contributing_models: Vec<String>,
}

impl ConsensusResult {
    /// agreement_count / total_responses (0 when nobody answered)
    pub fn agreement_ratio(&self) -> f64 {
        if self.total_responses == 0 {
            0.0
        } else {
            self.agreement_count as f64 / self.total_responses as f64
        }
    }
}

/// Outcome of the Tier-4 arbitration call and its heavy audit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudicialRecord {
    /// Arbiter that answered
    pub model_id: String,

    /// Arbiter's answer
    pub verdict: String,

    /// Arbiter's confidence
    pub confidence: f64,

    /// Whether the independent re-check passed
    pub audit_passed: bool,
}
