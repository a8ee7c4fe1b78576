//! Verify command implementation.

use super::build_pipeline;
use crate::cli::VerifyArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use tribunal_pipeline::{PipelineConfig, QueryRequest, ReplayLog};

/// Execute the verify command.
pub async fn execute_verify(
    args: VerifyArgs,
    config: PipelineConfig,
    formatter: &Formatter,
) -> Result<()> {
    let digest = verify_last(&args, config).await?;
    println!("{}", formatter.verified(&digest));
    Ok(())
}

/// Re-run the query with the last logged timestamp and likelihood.
///
/// Returns the matching digest, or [`CliError::ReplayMismatch`].
pub(crate) async fn verify_last(args: &VerifyArgs, config: PipelineConfig) -> Result<String> {
    let log = ReplayLog::new(&args.log);
    let stored = log
        .entries()?
        .pop()
        .ok_or(tribunal_pipeline::SnapshotError::EmptyLog)?;
    let stored_digest = stored.digest()?;

    let pipeline = build_pipeline(config, &args.corpora)?;
    let request = QueryRequest::new(args.query.as_str())
        .with_timestamp(stored.timestamp)
        .with_likelihood(stored.execution_plan.contradiction_likelihood);
    let outcome = pipeline.run(request).await?;

    if outcome.digest != stored_digest {
        return Err(CliError::ReplayMismatch {
            stored: stored_digest,
            fresh: outcome.digest,
        });
    }

    tracing::info!(digest = %stored_digest, "replay verified");
    Ok(stored_digest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::RunArgs;
    use crate::commands::run::run_query;
    use std::path::PathBuf;

    async fn logged(query: &str, log: PathBuf) {
        let args = RunArgs {
            query: query.to_string(),
            timestamp: Some(11),
            elevated: true,
            corpora: Vec::new(),
            log: Some(log),
        };
        run_query(&args, PipelineConfig::default()).await.unwrap();
    }

    fn verify_args(query: &str, log: PathBuf) -> VerifyArgs {
        VerifyArgs {
            query: query.to_string(),
            log,
            corpora: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_same_query_verifies() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runs.jsonl");
        logged("The engine is deterministic.", path.clone()).await;

        let args = verify_args("The engine is deterministic.", path.clone());
        let digest = verify_last(&args, PipelineConfig::default()).await.unwrap();
        assert_eq!(Some(digest), ReplayLog::new(&path).last_digest().unwrap());
    }

    #[tokio::test]
    async fn test_different_query_mismatches() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runs.jsonl");
        logged("The engine is deterministic.", path.clone()).await;

        let args = verify_args("The engine is random.", path);
        let err = verify_last(&args, PipelineConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CliError::ReplayMismatch { .. }));
    }

    #[tokio::test]
    async fn test_empty_log() {
        let dir = tempfile::tempdir().unwrap();
        let err = verify_last(
            &verify_args("anything", dir.path().join("missing.jsonl")),
            PipelineConfig::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            CliError::Snapshot(tribunal_pipeline::SnapshotError::EmptyLog)
        ));
    }
}
