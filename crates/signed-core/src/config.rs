//! Run configuration, built once at startup and immutable afterwards.

use std::path::PathBuf;
use std::time::Duration;

/// Policy inputs for one audit run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunConfig {
    /// Audit only commits after this one (exclusive).
    pub range_start: Option<String>,
    /// Treat every non-good signature as a gating failure.
    pub trust_commits: bool,
}

impl RunConfig {
    pub fn new(range_start: Option<String>, trust_commits: bool) -> Self {
        Self {
            range_start,
            trust_commits,
        }
    }
}

/// How the underlying `git log` process is launched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSourceConfig {
    /// Program to run (default: `git` from `PATH`).
    pub program: PathBuf,
    /// Working directory for the process (default: inherited).
    pub repo_dir: Option<PathBuf>,
    /// Abort the run if the log is not fully drained in time.
    pub timeout: Option<Duration>,
}

impl Default for LogSourceConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from("git"),
            repo_dir: None,
            timeout: None,
        }
    }
}

impl LogSourceConfig {
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_repo_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.repo_dir = Some(dir.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}
