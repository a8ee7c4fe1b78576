//! Error types for cache operations

use thiserror::Error;

/// Errors that can occur while configuring the cache
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CacheError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
