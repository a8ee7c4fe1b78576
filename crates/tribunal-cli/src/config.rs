//! Configuration loading for the CLI.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tribunal_pipeline::PipelineConfig;

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    #[default]
    Table,
    /// JSON format
    Json,
    /// Quiet (digest only) format
    Quiet,
}

/// Load the pipeline configuration from `path`, or use defaults.
pub fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    match path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading configuration");
            Ok(PipelineConfig::from_file(path)?)
        }
        None => Ok(PipelineConfig::default()),
    }
}
