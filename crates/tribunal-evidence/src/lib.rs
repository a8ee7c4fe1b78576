//! Tribunal Evidence Engine
//!
//! Estimates how well a claim set is backed by external knowledge.
//!
//! # Overview
//!
//! For each claim, the engine asks every registered [`EvidenceSource`] for
//! at most `max_results` snippets. A claim with at least one hit is
//! verified; a claim with none is a conflict. Density is the mean
//! per-claim hit saturation:
//!
//! ```text
//! evidence_density = Σ min(1, hits / max_results) / total_claims
//! escalation_required = evidence_density < threshold || conflicts non-empty
//! ```
//!
//! A source that times out or panics contributes nothing for that claim.
//! The engine itself never fails.
//!
//! [`EvidenceSource`]: tribunal_domain::EvidenceSource

#![warn(missing_docs)]

mod config;
mod corpus;
mod engine;
mod error;

pub use config::EvidenceConfig;
pub use corpus::CorpusSource;
pub use engine::EvidenceEngine;
pub use error::EvidenceError;
