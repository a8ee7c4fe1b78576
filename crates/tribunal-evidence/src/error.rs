//! Error types for evidence configuration and corpora

use thiserror::Error;

/// Errors that can occur while setting up evidence sources
///
/// Lookups themselves never produce errors; see [`crate::EvidenceEngine`].
#[derive(Error, Debug)]
pub enum EvidenceError {
    /// Corpus file could not be read
    #[error("Failed to read corpus: {0}")]
    Io(#[from] std::io::Error),

    /// Corpus file is not valid TOML
    #[error("Failed to parse corpus: {0}")]
    Parse(#[from] toml::de::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
