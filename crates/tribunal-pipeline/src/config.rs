//! Pipeline configuration

use crate::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tribunal_cache::CacheConfig;
use tribunal_consensus::ConsensusConfig;
use tribunal_evidence::EvidenceConfig;
use tribunal_llm::AssuranceConfig;
use tribunal_premise::PremiseConfig;
use tribunal_synthesizer::SynthesisConfig;
use tribunal_validator::ValidatorConfig;

/// Default Ollama endpoint used when simulation is off
pub const DEFAULT_OLLAMA_ENDPOINT: &str = "http://localhost:11434";

/// Every setting a pipeline is built from
///
/// `simulation` is a per-pipeline value, so two pipelines in one process
/// can run with different settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Use simulated responders and skip health checks
    pub simulation: bool,

    /// Maximum tolerated fraction of failed calls per Tier-1 batch
    pub error_budget: f64,

    /// Minimum number of responders that must answer
    pub quorum: usize,

    /// Minimum arbiter confidence for the heavy audit to pass
    pub audit_min_confidence: f64,

    /// Responder names used by the CLI
    pub responders: Vec<String>,

    /// Arbiter name used by the CLI
    pub arbiter: String,

    /// Ollama endpoint used when simulation is off
    pub ollama_endpoint: String,

    /// Premise structuring
    pub premise: PremiseConfig,

    /// Model Assurance Layer
    pub assurance: AssuranceConfig,

    /// Tier-2 validator
    pub validator: ValidatorConfig,

    /// Tier-3 evidence engine
    pub evidence: EvidenceConfig,

    /// Consensus scoring and grading
    pub consensus: ConsensusConfig,

    /// Tier-1 batch cache
    pub cache: CacheConfig,

    /// Answer synthesis
    pub synthesis: SynthesisConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            simulation: true,
            error_budget: 0.34,
            quorum: 1,
            audit_min_confidence: 0.7,
            responders: vec!["alpha".to_string(), "beta".to_string()],
            arbiter: "arbiter".to_string(),
            ollama_endpoint: DEFAULT_OLLAMA_ENDPOINT.to_string(),
            premise: PremiseConfig::default(),
            assurance: AssuranceConfig::default(),
            validator: ValidatorConfig::default(),
            evidence: EvidenceConfig::default(),
            consensus: ConsensusConfig::default(),
            cache: CacheConfig::default(),
            synthesis: SynthesisConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Strict preset: no failed calls tolerated, two responders required
    pub fn strict() -> Self {
        Self {
            error_budget: 0.0,
            quorum: 2,
            audit_min_confidence: 0.85,
            validator: ValidatorConfig::strict(),
            cache: CacheConfig::aggressive(),
            ..Default::default()
        }
    }

    /// Permissive preset: half the calls may fail
    pub fn permissive() -> Self {
        Self {
            error_budget: 0.5,
            audit_min_confidence: 0.5,
            validator: ValidatorConfig::permissive(),
            cache: CacheConfig::lenient(),
            ..Default::default()
        }
    }

    /// Validate this configuration and every stage configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.error_budget) {
            return Err(ConfigError::Invalid(format!(
                "error_budget must be within [0, 1], got {}",
                self.error_budget
            )));
        }
        if self.quorum == 0 {
            return Err(ConfigError::Invalid(
                "quorum must be greater than 0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.audit_min_confidence) {
            return Err(ConfigError::Invalid(format!(
                "audit_min_confidence must be within [0, 1], got {}",
                self.audit_min_confidence
            )));
        }

        self.premise.validate().map_err(ConfigError::Invalid)?;
        self.assurance.validate().map_err(invalid)?;
        self.validator.validate().map_err(invalid)?;
        self.evidence.validate().map_err(invalid)?;
        self.consensus.validate().map_err(invalid)?;
        self.cache.validate().map_err(invalid)?;
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Load and validate configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&content)?;
        config.validate()?;
        Ok(config)
    }
}

fn invalid(e: impl std::fmt::Display) -> ConfigError {
    ConfigError::Invalid(e.to_string())
}
