//! Validator configuration

use crate::ValidatorError;
use serde::{Deserialize, Serialize};

/// Thresholds and triggers for the Tier-2 check
///
/// The similarity thresholds are placeholder heuristics, not calibrated
/// values; they are configurable for that reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Pairs below this cosine similarity are a semantic divergence
    pub similarity_threshold: f64,

    /// Words in the raw input that force the check
    pub trigger_keywords: Vec<String>,

    /// Mean Tier-1 confidence below this forces the check
    pub low_confidence_threshold: f64,

    /// Similarity threshold used by the narrowed retry
    pub narrowed_similarity_threshold: f64,

    /// Length of the hashed embedding vectors
    pub embedding_dimension: usize,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.85,
            trigger_keywords: ["why", "prove", "reason", "derive", "because", "causal"]
                .into_iter()
                .map(String::from)
                .collect(),
            low_confidence_threshold: 0.5,
            narrowed_similarity_threshold: 0.70,
            embedding_dimension: 64,
        }
    }
}

impl ValidatorConfig {
    /// Create a permissive configuration (fewer contradictions, rarer triggers)
    pub fn permissive() -> Self {
        Self {
            similarity_threshold: 0.5,
            low_confidence_threshold: 0.3,
            narrowed_similarity_threshold: 0.3,
            ..Default::default()
        }
    }

    /// Create a strict configuration (more contradictions, earlier triggers)
    pub fn strict() -> Self {
        Self {
            similarity_threshold: 0.95,
            low_confidence_threshold: 0.7,
            narrowed_similarity_threshold: 0.85,
            ..Default::default()
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ValidatorError> {
        for (name, value) in [
            ("similarity_threshold", self.similarity_threshold),
            ("low_confidence_threshold", self.low_confidence_threshold),
            ("narrowed_similarity_threshold", self.narrowed_similarity_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ValidatorError::Config(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }
        if self.narrowed_similarity_threshold > self.similarity_threshold {
            return Err(ValidatorError::Config(
                "narrowed_similarity_threshold cannot exceed similarity_threshold".to_string(),
            ));
        }
        if self.embedding_dimension == 0 {
            return Err(ValidatorError::Config(
                "embedding_dimension must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ValidatorConfig::default();
        assert_eq!(config.similarity_threshold, 0.85);
        assert_eq!(config.trigger_keywords.len(), 6);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_presets_are_valid() {
        assert!(ValidatorConfig::permissive().validate().is_ok());
        assert!(ValidatorConfig::strict().validate().is_ok());
        assert!(
            ValidatorConfig::strict().similarity_threshold
                > ValidatorConfig::permissive().similarity_threshold
        );
    }

    #[test]
    fn test_invalid_thresholds() {
        let config = ValidatorConfig {
            similarity_threshold: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ValidatorConfig {
            narrowed_similarity_threshold: 0.9,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ValidatorConfig {
            embedding_dimension: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
