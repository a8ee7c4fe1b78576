//! Error types for pipeline runs, snapshots and configuration

use crate::escalation::TransitionError;
use thiserror::Error;
use tribunal_domain::ResponderError;
use tribunal_ensemble::ExecutorError;
use tribunal_validator::ValidatorError;

/// Errors that can end a pipeline run
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The Tier-1 batch tripped its error budget
    #[error(transparent)]
    Executor(#[from] ExecutorError),

    /// Fewer responders answered than the quorum requires
    #[error("Quorum not reached: {got} responders answered, {need} required")]
    QuorumNotReached {
        /// Responders that answered
        got: usize,
        /// Responders required
        need: usize,
    },

    /// Contradiction detection failed
    #[error("Validator error: {0}")]
    Validator(#[from] ValidatorError),

    /// The arbitration call failed
    #[error("Arbitration failed: {0}")]
    Arbitration(#[source] ResponderError),

    /// The escalation ladder was driven out of order
    #[error(transparent)]
    Escalation(#[from] TransitionError),

    /// The assembled snapshot is malformed
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    /// The pipeline could not be built
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors from snapshot validation and the replay log
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// Snapshot shape or values are invalid
    #[error("Invalid snapshot: {0}")]
    Invalid(String),

    /// Snapshot could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Replay log I/O failed
    #[error("Replay log I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The replay log has no entries to compare against
    #[error("Replay log is empty")]
    EmptyLog,
}

/// Errors from loading or validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file could not be read
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration is not valid TOML
    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// Configuration could not be written as TOML
    #[error("Failed to serialize to TOML: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A value is out of range
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
