//! Evidence engine configuration

use crate::EvidenceError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Lookup bounds and the escalation threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvidenceConfig {
    /// Maximum hits counted per claim
    pub max_results: usize,

    /// Density below this requires escalation
    pub density_threshold: f64,

    /// Per-source lookup timeout (milliseconds)
    pub lookup_timeout_ms: u64,
}

impl Default for EvidenceConfig {
    fn default() -> Self {
        Self {
            max_results: 3,
            density_threshold: 0.4,
            lookup_timeout_ms: 2000,
        }
    }
}

impl EvidenceConfig {
    /// Get the lookup timeout as a Duration
    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.lookup_timeout_ms)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), EvidenceError> {
        if self.max_results == 0 {
            return Err(EvidenceError::Config(
                "max_results must be greater than 0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.density_threshold) {
            return Err(EvidenceError::Config(format!(
                "density_threshold must be within [0, 1], got {}",
                self.density_threshold
            )));
        }
        if self.lookup_timeout_ms == 0 {
            return Err(EvidenceError::Config(
                "lookup_timeout_ms must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
