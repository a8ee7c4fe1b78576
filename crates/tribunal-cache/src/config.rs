//! Configuration for the stale-while-revalidate cache
//!
//! Defines how long an entry is served as fresh, and how long after that it
//! may still be served while a refresh runs.

use crate::CacheError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Cache freshness windows
///
/// # Examples
///
/// ```
/// use tribunal_cache::CacheConfig;
///
/// let config = CacheConfig::default();
/// assert_eq!(config.fresh_ttl_secs, 300);
///
/// let config = CacheConfig::aggressive();
/// assert!(config.fresh_ttl_secs < CacheConfig::default().fresh_ttl_secs);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Age (seconds) below which an entry is fresh
    pub fresh_ttl_secs: u64,

    /// Extra age (seconds) during which a stale entry may still be served
    pub stale_ttl_secs: u64,
}

impl Default for CacheConfig {
    /// Five minutes fresh, one further hour stale
    fn default() -> Self {
        Self {
            fresh_ttl_secs: 300,
            stale_ttl_secs: 3600,
        }
    }
}

impl CacheConfig {
    /// Short windows for fast-moving inputs
    pub fn aggressive() -> Self {
        Self {
            fresh_ttl_secs: 30,
            stale_ttl_secs: 300,
        }
    }

    /// Long windows for replay-heavy workloads
    pub fn lenient() -> Self {
        Self {
            fresh_ttl_secs: 3600,
            stale_ttl_secs: 86_400,
        }
    }

    /// Fresh window as a Duration
    pub fn fresh_ttl(&self) -> Duration {
        Duration::from_secs(self.fresh_ttl_secs)
    }

    /// Stale window as a Duration
    pub fn stale_ttl(&self) -> Duration {
        Duration::from_secs(self.stale_ttl_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), CacheError> {
        if self.fresh_ttl_secs == 0 {
            return Err(CacheError::Config(
                "fresh_ttl_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
