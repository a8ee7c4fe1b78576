//! Tribunal Domain Layer
//!
//! This crate contains the data model shared by every stage of the tiered
//! consensus pipeline, together with the capability traits through which the
//! pipeline talks to the outside world. It carries no infrastructure: the
//! only dependencies are `serde` (snapshots are serialized), `thiserror`
//! and `async-trait` (responders are awaited through trait objects).
//!
//! ## Key Concepts
//!
//! - **Premise**: one atomic claim from the query, labelled true/false/uncertain
//! - **ProviderResponse**: a responder's answer, validated at construction
//! - **Tier results**: Tier-1 entries, Tier-2 verdicts, the evidence packet
//! - **Witness / Consensus**: the adjudication outputs and the letter grade
//! - **ExecutionPlan**: which stages ran, frozen before snapshotting
//!
//! ## Architecture
//!
//! - Pure data and validation only
//! - Trait definitions (`Responder`, `EvidenceSource`) for all external calls
//! - Implementations live in the adapter crates

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod consensus;
pub mod error;
pub mod evidence;
pub mod premise;
pub mod response;
pub mod tier;
pub mod traits;

// Re-exports for convenience
pub use consensus::{ConsensusResult, Grade, JudicialRecord, Witness};
pub use error::{DomainError, ResponderError};
pub use evidence::{EvidencePacket, KnowledgeSnippet};
pub use premise::{Label, Premise};
pub use response::{normalize_answer, ProviderResponse};
pub use tier::{
    ContradictionLikelihood, ExecutionPlan, ExecutionPlanBuilder, TierOneEntry, TierStage,
    TierTwoResult,
};
pub use traits::{EvidenceSource, Responder, ResponderSet};
