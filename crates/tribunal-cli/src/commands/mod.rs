//! Command implementations.

pub mod config;
pub mod replay;
pub mod run;
pub mod verify;

pub use self::config::execute_config;
pub use self::replay::execute_replay;
pub use self::run::execute_run;
pub use self::verify::execute_verify;

use crate::error::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tribunal_evidence::CorpusSource;
use tribunal_pipeline::{ConsensusPipeline, PipelineConfig};

/// Assemble a pipeline from the configuration and corpus files.
pub(crate) fn build_pipeline(
    config: PipelineConfig,
    corpora: &[PathBuf],
) -> Result<ConsensusPipeline> {
    let mut builder = ConsensusPipeline::builder(config).with_configured_responders();

    for path in corpora {
        let corpus = CorpusSource::from_file(path)?;
        tracing::debug!(path = %path.display(), snippets = corpus.len(), "corpus loaded");
        builder = builder.evidence_source(Arc::new(corpus));
    }

    Ok(builder.build()?)
}
