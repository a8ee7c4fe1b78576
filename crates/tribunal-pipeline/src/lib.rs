//! Tribunal Pipeline
//!
//! Orchestrates one query through the tiered consensus ladder and records
//! the run as a hashable snapshot.
//!
//! # Overview
//!
//! - **Escalation**: a pure state machine deciding which tier runs next
//! - **Arbitration**: the single expensive Tier-4 call plus its heavy audit
//! - **Snapshot**: canonical JSON and SHA-256 digest of a run
//! - **Replay log**: append-only JSON lines of snapshots, verifiable later
//!
//! # Examples
//!
//! ```
//! use tribunal_pipeline::{ConsensusPipeline, PipelineConfig, QueryRequest};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let pipeline = ConsensusPipeline::builder(PipelineConfig::default())
//!     .with_simulated_responders(["alpha", "beta"])
//!     .build()?;
//!
//! let outcome = pipeline
//!     .run(QueryRequest::new("The engine is deterministic.").with_timestamp(1))
//!     .await?;
//! assert_eq!(outcome.digest.len(), 64);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod arbitration;
mod config;
mod error;
pub mod escalation;
mod pipeline;
mod replay;
mod snapshot;

pub use arbitration::Arbitrator;
pub use config::{PipelineConfig, DEFAULT_OLLAMA_ENDPOINT};
pub use error::{ConfigError, PipelineError, SnapshotError};
pub use escalation::{transition, Escalation, EscalationEvent, EscalationState, TransitionError};
pub use pipeline::{
    ConsensusPipeline, ConsensusPipelineBuilder, PipelineOutcome, QueryRequest, RunTelemetry,
};
pub use replay::ReplayLog;
pub use snapshot::StateSnapshot;
