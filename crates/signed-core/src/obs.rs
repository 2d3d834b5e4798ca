//! Structured observability hooks for the audit lifecycle.
//!
//! Events are emitted through `tracing`; verbosity and format are controlled
//! by [`crate::telemetry::init_tracing`] and `RUST_LOG`.

use tracing::{debug, info, warn};

use crate::config::RunConfig;
use crate::domain::{AuditError, CommitRecord};
use crate::verdict::Verdict;

/// Span tagging every audit event with the run's range and mode.
pub fn audit_span(config: &RunConfig) -> tracing::Span {
    tracing::info_span!(
        "git_signed.audit",
        range_start = config.range_start.as_deref().unwrap_or("<root>"),
        trust_commits = config.trust_commits,
    )
}

pub fn emit_audit_started(program: &str) {
    info!(event = "audit.started", program = %program);
}

pub fn emit_line_classified(seq: usize, record: &CommitRecord) {
    debug!(
        event = "audit.line_classified",
        seq = seq,
        code = %record.signature,
        hash = %record.hash,
    );
}

/// Emit event: audit finished with bucket sizes and the decided exit code.
pub fn emit_audit_finished(verdict: &Verdict, invalidated: usize, unsigned: usize) {
    info!(
        event = "audit.finished",
        total = verdict.summary.total,
        invalidated = invalidated,
        unsigned = unsigned,
        exit_code = verdict.exit_code,
        digest = %verdict.digest,
    );
}

/// Emit event: audit aborted before a verdict could be computed.
pub fn emit_audit_aborted(error: &AuditError) {
    warn!(event = "audit.aborted", exit_code = error.exit_code(), error = %error);
}
