//! Tribunal Ensemble
//!
//! First-pass fan-out of a claim set to every configured responder.
//!
//! # Architecture
//!
//! ```text
//! claims ─┬─ SafeExecutor(claim 1) ── responders run concurrently ─┐
//!         ├─ SafeExecutor(claim 2) ── ...                           ├→ TierOneBatch
//!         └─ SafeExecutor(claim n) ── ...                           ┘
//! ```
//!
//! The [`SafeExecutor`] enforces an all-or-nothing error budget per batch.
//! The [`TierOneEnsemble`] caches whole batches by claim-set fingerprint,
//! so a repeated input never reaches the responders again.

#![warn(missing_docs)]

mod error;
mod executor;
mod tier_one;

pub use error::ExecutorError;
pub use executor::SafeExecutor;
pub use tier_one::{CallTelemetry, TierOneBatch, TierOneEnsemble, CLAIM_PROMPT_PREFIX};
