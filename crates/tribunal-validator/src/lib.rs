//! Tribunal Validator
//!
//! Tier-2 contradiction detection over a structured claim set.
//!
//! # Overview
//!
//! The validator is gated: it only runs when cheap signals say it is worth
//! the cost (trigger keywords in the input, disagreements from Tier-1,
//! an elevated declared likelihood, or low ensemble confidence). When it
//! runs it compares every pair of claims:
//!
//! - cosine similarity below the threshold → "semantic divergence"
//! - otherwise, differing labels → "label conflict"
//!
//! A failed check may be retried once under narrowed assumptions: pairs
//! involving uncertain claims are treated as resolved and a looser
//! similarity threshold applies.
//!
//! "Similarity" here is a hashed bag-of-words cosine, an approximation and
//! nothing more.

#![warn(missing_docs)]

mod config;
mod detector;
pub mod embedding;
mod error;

pub use config::ValidatorConfig;
pub use detector::{ContradictionDetector, GateSignals, Tier2Trigger};
pub use embedding::{cosine_similarity, EmbeddingModel, HashedEmbeddingModel};
pub use error::ValidatorError;
