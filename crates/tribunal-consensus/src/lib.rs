//! Tribunal Consensus
//!
//! Witness selection, agreement measurement, weighted scoring and grading.
//!
//! # Scoring
//!
//! ```text
//! score = agreement% × 0.30
//!       + stability   × 0.25   (Tier-2 score, or 100 when Tier-2 did not run)
//!       + evidence    × 0.30   (density × 100, or mean Tier-1 score)
//!       + 10          if arbitration ran
//!       − dissent penalty
//! clamped to [0, 100]
//! ```
//!
//! # Grading
//!
//! Grades come from a [`GradeTable`] keyed on agreement ratio and whether
//! Tier-3 evidence verified the claims, then capped by the score's
//! qualitative [`Bucket`].

#![warn(missing_docs)]

mod agreement;
mod config;
mod error;
mod grading;
mod scorer;
mod witness;

pub use agreement::{majority_answers, Agreement};
pub use config::{ConsensusConfig, ConsensusWeights};
pub use error::ConsensusError;
pub use grading::{Bucket, BucketCutoffs, GradeRow, GradeTable};
pub use scorer::{ConsensusComputer, ConsensusInputs, ConsensusReport, ScoreBreakdown};
pub use witness::{dissent_fraction, ReliableWitnessLocator};
