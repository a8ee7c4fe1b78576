//! Run command implementation.

use super::build_pipeline;
use crate::cli::RunArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use tribunal_domain::ContradictionLikelihood;
use tribunal_pipeline::{PipelineConfig, PipelineOutcome, QueryRequest, ReplayLog};

/// Execute the run command.
pub async fn execute_run(
    args: RunArgs,
    config: PipelineConfig,
    formatter: &Formatter,
) -> Result<()> {
    let outcome = run_query(&args, config).await?;
    println!("{}", formatter.format_outcome(&outcome)?);
    Ok(())
}

/// Run one query and optionally append the snapshot to the replay log.
pub(crate) async fn run_query(args: &RunArgs, config: PipelineConfig) -> Result<PipelineOutcome> {
    if args.query.trim().is_empty() {
        return Err(CliError::InvalidInput("Query must not be empty".to_string()));
    }

    let pipeline = build_pipeline(config, &args.corpora)?;

    let mut request = QueryRequest::new(args.query.as_str());
    if let Some(timestamp) = args.timestamp {
        request = request.with_timestamp(timestamp);
    }
    if args.elevated {
        request = request.with_likelihood(ContradictionLikelihood::Elevated);
    }

    let outcome = pipeline.run(request).await?;

    if let Some(path) = &args.log {
        let log = ReplayLog::new(path);
        log.append(&outcome.snapshot)?;
        tracing::info!(log = %path.display(), digest = %outcome.digest, "snapshot logged");
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(query: &str) -> RunArgs {
        RunArgs {
            query: query.to_string(),
            timestamp: Some(4),
            elevated: false,
            corpora: Vec::new(),
            log: None,
        }
    }

    #[tokio::test]
    async fn test_run_appends_to_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runs.jsonl");
        let mut args = args("The engine is deterministic.");
        args.log = Some(path.clone());

        let outcome = run_query(&args, PipelineConfig::default()).await.unwrap();
        assert_eq!(outcome.snapshot.timestamp, 4);

        let log = ReplayLog::new(&path);
        assert_eq!(log.last_digest().unwrap().as_deref(), Some(outcome.digest.as_str()));
    }

    #[tokio::test]
    async fn test_elevated_flag_forces_contradiction_check() {
        let mut args = args("The sky is blue.");
        args.elevated = true;

        let outcome = run_query(&args, PipelineConfig::default()).await.unwrap();
        assert!(outcome.snapshot.tier2.is_some());
    }

    #[tokio::test]
    async fn test_empty_query_rejected() {
        let err = run_query(&args("  "), PipelineConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CliError::InvalidInput(_)));
    }
}
