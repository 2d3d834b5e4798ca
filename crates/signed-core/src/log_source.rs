//! Streaming access to `git log` signature output.
//!
//! The log is exposed as a lazy, finite, non-restartable sequence of lines.
//! Consumers call [`LogLines::next_line`] until it yields `Ok(None)`. A git
//! process that exits with a failure status surfaces as an error at the end
//! of the stream, so a consumer can never mistake a truncated log for a
//! complete one.

use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader, Lines};
use tokio::process::{Child, ChildStdout, Command};
use tracing::debug;

use crate::config::LogSourceConfig;
use crate::domain::{AuditError, Result};

/// Pretty format understood by [`crate::classifier::classify_line`].
pub const LOG_FORMAT: &str = "%G? %h %aN\t%s";

/// A forward-only source of log lines.
#[async_trait]
pub trait LogLines: Send {
    /// Next line, or `Ok(None)` once the log is exhausted.
    async fn next_line(&mut self) -> Result<Option<String>>;
}

/// Arguments for `git`, restricted to commits after `range_start` if given.
pub fn log_args(range_start: Option<&str>) -> Vec<String> {
    let mut args = vec![
        "log".to_string(),
        "--no-merges".to_string(),
        format!("--pretty=format:{LOG_FORMAT}"),
    ];
    if let Some(start) = range_start {
        args.push(format!("{start}.."));
    }
    args
}

/// Line stream backed by a live `git log` child process.
///
/// The child's stderr is inherited so git's own diagnostics reach the
/// operator untouched. Dropping the source kills the child.
pub struct GitLogSource {
    program: String,
    child: Child,
    lines: Lines<BufReader<ChildStdout>>,
    exhausted: bool,
}

impl GitLogSource {
    /// Spawn `git log` according to `config`.
    pub fn spawn(config: &LogSourceConfig, range_start: Option<&str>) -> Result<Self> {
        let args = log_args(range_start);
        let mut command = Command::new(&config.program);
        command
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);
        if let Some(dir) = &config.repo_dir {
            command.current_dir(dir);
        }

        debug!(program = %config.program.display(), ?args, "spawning log source");
        let mut child = command.spawn().map_err(|source| AuditError::LaunchFailure {
            program: config.program.clone(),
            source,
        })?;

        let stdout = child.stdout.take().ok_or_else(|| {
            AuditError::Io(std::io::Error::other("child stdout was not captured"))
        })?;

        Ok(Self {
            program: config.program.display().to_string(),
            child,
            lines: BufReader::new(stdout).lines(),
            exhausted: false,
        })
    }

    async fn reap(&mut self) -> Result<()> {
        let status = self.child.wait().await?;
        match status.code() {
            Some(0) => Ok(()),
            Some(code) if code > 0 => Err(AuditError::SubprocessFailure {
                program: self.program.clone(),
                code,
            }),
            _ => Err(AuditError::SubprocessTerminated {
                program: self.program.clone(),
            }),
        }
    }
}

#[async_trait]
impl LogLines for GitLogSource {
    async fn next_line(&mut self) -> Result<Option<String>> {
        if self.exhausted {
            return Ok(None);
        }
        match self.lines.next_line().await? {
            Some(line) => Ok(Some(line)),
            None => {
                self.exhausted = true;
                self.reap().await?;
                Ok(None)
            }
        }
    }
}

/// In-memory line source, mainly for tests and replaying captured logs.
///
/// An optional exit code is reported once the lines run out, mimicking a
/// git process that failed after (or without) producing output.
#[derive(Debug, Clone, Default)]
pub struct MemoryLogSource {
    lines: std::collections::VecDeque<String>,
    exit_code: Option<i32>,
    exhausted: bool,
}

impl MemoryLogSource {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            exit_code: None,
            exhausted: false,
        }
    }

    /// Fail with `code` at end of stream.
    pub fn failing_with(mut self, code: i32) -> Self {
        self.exit_code = Some(code);
        self
    }
}

#[async_trait]
impl LogLines for MemoryLogSource {
    async fn next_line(&mut self) -> Result<Option<String>> {
        if self.exhausted {
            return Ok(None);
        }
        if let Some(line) = self.lines.pop_front() {
            return Ok(Some(line));
        }
        self.exhausted = true;
        match self.exit_code {
            Some(code) if code != 0 => Err(AuditError::SubprocessFailure {
                program: "git".to_string(),
                code,
            }),
            _ => Ok(None),
        }
    }
}
