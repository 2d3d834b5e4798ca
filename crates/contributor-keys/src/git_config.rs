//! Reading and writing repository-local git configuration.

use std::path::PathBuf;
use std::process::Command;
use tracing::debug;

use crate::error::KeysError;
use crate::Result;

/// git config access for one repository.
#[derive(Debug, Clone)]
pub struct GitConfig {
    program: PathBuf,
    repo_dir: Option<PathBuf>,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self::new("git", None)
    }
}

impl GitConfig {
    pub fn new(program: impl Into<PathBuf>, repo_dir: Option<PathBuf>) -> Self {
        Self {
            program: program.into(),
            repo_dir,
        }
    }

    fn command(&self, args: &[&str]) -> Result<std::process::Output> {
        let mut command = Command::new(&self.program);
        command.args(args);
        if let Some(dir) = &self.repo_dir {
            command.current_dir(dir);
        }
        command.output().map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => KeysError::GitNotFound(self.program.clone()),
            _ => KeysError::Io(e),
        })
    }

    /// Value of `key`, or `None` when unset.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let output = self.command(&["config", "--get", key])?;
        match output.status.code() {
            Some(0) => {
                let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
                Ok(Some(value).filter(|v| !v.is_empty()))
            }
            // `git config --get` exits 1 for a missing key
            Some(1) => Ok(None),
            _ => Err(KeysError::GitCommandFailed {
                command: format!("config --get {key}"),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }),
        }
    }

    /// Set `key` in the repository-local config.
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        debug!(key = %key, value = %value, "setting git config");
        let output = self.command(&["config", key, value])?;
        if !output.status.success() {
            return Err(KeysError::GitCommandFailed {
                command: format!("config {key}"),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }

    /// URL of the `origin` remote, if one is configured.
    pub fn origin_url(&self) -> Result<Option<String>> {
        self.get("remote.origin.url")
    }

    /// Point the repository at `key_id` and sign every commit.
    pub fn configure_signing(&self, name: &str, email: &str, key_id: &str) -> Result<()> {
        self.set("user.name", name)?;
        self.set("user.email", email)?;
        self.set("user.signingkey", key_id)?;
        self.set("commit.gpgsign", "true")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_git_repo() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let status = Command::new("git")
            .args(["init"])
            .current_dir(dir.path())
            .output()
            .unwrap();
        assert!(status.status.success());
        dir
    }

    #[test]
    fn test_set_then_get() {
        let repo = make_git_repo();
        let git = GitConfig::new("git", Some(repo.path().to_path_buf()));
        git.set("user.name", "Test User").unwrap();
        assert_eq!(git.get("user.name").unwrap().as_deref(), Some("Test User"));
    }

    #[test]
    fn test_missing_key_is_none() {
        let repo = make_git_repo();
        let git = GitConfig::new("git", Some(repo.path().to_path_buf()));
        assert_eq!(git.get("gitsigned.nosuchkey").unwrap(), None);
        assert_eq!(git.origin_url().unwrap(), None);
    }

    #[test]
    fn test_configure_signing() {
        let repo = make_git_repo();
        let git = GitConfig::new("git", Some(repo.path().to_path_buf()));
        git.configure_signing("Alice", "alice@example.com", "ABCD1234")
            .unwrap();
        assert_eq!(git.get("user.signingkey").unwrap().as_deref(), Some("ABCD1234"));
        assert_eq!(git.get("commit.gpgsign").unwrap().as_deref(), Some("true"));
    }

    #[test]
    fn test_missing_git_binary() {
        let git = GitConfig::new("/nonexistent/bin/git", None);
        assert!(matches!(git.get("user.name"), Err(KeysError::GitNotFound(_))));
    }
}
