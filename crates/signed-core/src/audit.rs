//! The audit driver: one consumer loop from log lines to a verdict.

use tracing::Instrument;

use crate::aggregator::{Aggregator, Buckets};
use crate::classifier::classify_line;
use crate::config::{LogSourceConfig, RunConfig};
use crate::domain::{AuditError, Result};
use crate::log_source::{GitLogSource, LogLines};
use crate::obs;
use crate::verdict::{evaluate, Verdict};

/// Drain `source`, classifying and aggregating each line in arrival order.
///
/// Fails fast on the first malformed line or on a failing source; in that
/// case the partial buckets are dropped.
pub async fn collect<S>(source: &mut S) -> Result<Buckets>
where
    S: LogLines + ?Sized,
{
    let mut aggregator = Aggregator::new();
    while let Some(line) = source.next_line().await? {
        let record = classify_line(&line)?;
        obs::emit_line_classified(aggregator.len() + 1, &record);
        aggregator.push(record);
    }
    Ok(aggregator.finish())
}

/// Run a full audit over an already-open line source.
pub async fn run_audit<S>(source: &mut S, config: &RunConfig) -> Result<Verdict>
where
    S: LogLines + ?Sized,
{
    let outcome = drain_and_evaluate(source, config).await;
    if let Err(error) = &outcome {
        obs::emit_audit_aborted(error);
    }
    outcome
}

async fn drain_and_evaluate<S>(source: &mut S, config: &RunConfig) -> Result<Verdict>
where
    S: LogLines + ?Sized,
{
    let buckets = collect(source).await?;
    let verdict = evaluate(&buckets, config)?;
    obs::emit_audit_finished(&verdict, buckets.invalidated.len(), buckets.unsigned.len());
    Ok(verdict)
}

/// Spawn `git log` for `config` and audit its output.
///
/// With a timeout configured, the child is killed and the run aborted once
/// the deadline passes.
pub async fn audit_repository(
    config: &RunConfig,
    source_config: &LogSourceConfig,
) -> Result<Verdict> {
    audit_spawned(config, source_config)
        .instrument(obs::audit_span(config))
        .await
}

async fn audit_spawned(config: &RunConfig, source_config: &LogSourceConfig) -> Result<Verdict> {
    obs::emit_audit_started(&source_config.program.display().to_string());
    let mut source = GitLogSource::spawn(source_config, config.range_start.as_deref())
        .inspect_err(obs::emit_audit_aborted)?;

    let Some(timeout) = source_config.timeout else {
        return run_audit(&mut source, config).await;
    };

    match tokio::time::timeout(timeout, run_audit(&mut source, config)).await {
        Ok(outcome) => outcome,
        Err(_) => {
            let error = AuditError::Timeout {
                secs: timeout.as_secs(),
            };
            obs::emit_audit_aborted(&error);
            Err(error)
        }
    }
}
