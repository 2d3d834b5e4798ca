//! Error taxonomy for audit runs.
//!
//! Every variant here is fatal: the run aborts and no verdict is rendered.
//! Policy violations (unsigned or untrusted commits) are not errors; they are
//! encoded in the verdict's exit code.

use std::path::PathBuf;

/// Fatal audit errors.
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("malformed log line ({reason}): {line:?}")]
    MalformedLogLine { line: String, reason: &'static str },

    #[error("{program} exited with status {code}")]
    SubprocessFailure { program: String, code: i32 },

    #[error("{program} was terminated before reporting an exit status")]
    SubprocessTerminated { program: String },

    #[error("failed to launch {program}: {source}")]
    LaunchFailure {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("git log did not finish within {secs} seconds")]
    Timeout { secs: u64 },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl AuditError {
    pub(crate) fn malformed(line: &str, reason: &'static str) -> Self {
        AuditError::MalformedLogLine {
            line: line.to_string(),
            reason,
        }
    }

    /// Process exit code for this failure.
    ///
    /// A failing `git log` hands its own status through unchanged; everything
    /// else this tool raises exits with `1`.
    pub fn exit_code(&self) -> u8 {
        match self {
            AuditError::SubprocessFailure { code, .. } => u8::try_from(*code)
                .ok()
                .filter(|c| *c != 0)
                .unwrap_or(1),
            _ => 1,
        }
    }
}

/// Result type for audit operations.
pub type Result<T> = std::result::Result<T, AuditError>;
