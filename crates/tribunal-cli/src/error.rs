//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error(transparent)]
    Config(#[from] tribunal_pipeline::ConfigError),

    /// Pipeline run failed
    #[error(transparent)]
    Pipeline(#[from] tribunal_pipeline::PipelineError),

    /// Replay log error
    #[error(transparent)]
    Snapshot(#[from] tribunal_pipeline::SnapshotError),

    /// Evidence corpus could not be loaded
    #[error(transparent)]
    Evidence(#[from] tribunal_evidence::EvidenceError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Re-run digest differs from the logged one
    #[error("Replay mismatch: logged {stored}, re-run produced {fresh}")]
    ReplayMismatch {
        /// Digest in the log
        stored: String,
        /// Digest of the re-run
        fresh: String,
    },

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
