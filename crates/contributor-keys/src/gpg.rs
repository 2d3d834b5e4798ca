//! Thin wrapper around the `gpg` command line.

use std::path::PathBuf;
use std::process::{Command, Output};
use tracing::{debug, info};

use crate::error::KeysError;
use crate::listing::{parser_for, KeyListingDialect, SecretKey};
use crate::Result;

/// Handle on a gpg executable.
#[derive(Debug, Clone)]
pub struct Gpg {
    program: PathBuf,
}

impl Default for Gpg {
    fn default() -> Self {
        Self::new("gpg")
    }
}

impl Gpg {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn run(&self, args: &[&str]) -> Result<Output> {
        debug!(program = %self.program.display(), ?args, "running gpg");
        let output = Command::new(&self.program)
            .args(args)
            .output()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => KeysError::GpgNotFound(self.program.clone()),
                _ => KeysError::Io(e),
            })?;

        if !output.status.success() {
            return Err(KeysError::GpgCommandFailed {
                command: args.join(" "),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(output)
    }

    /// Detect the key-listing dialect of this gpg. Unrecognised version
    /// banners are treated as modern.
    pub fn dialect(&self) -> Result<KeyListingDialect> {
        let output = self.run(&["--version"])?;
        let banner = String::from_utf8_lossy(&output.stdout);
        let dialect =
            KeyListingDialect::from_version_output(&banner).unwrap_or(KeyListingDialect::Modern);
        debug!(?dialect, "detected gpg key listing dialect");
        Ok(dialect)
    }

    /// All secret keys in the local keyring.
    pub fn list_secret_keys(&self) -> Result<Vec<SecretKey>> {
        let parser = parser_for(self.dialect()?);
        let output = self.run(&["--list-secret-keys"])?;
        Ok(parser.parse(&String::from_utf8_lossy(&output.stdout)))
    }

    /// Publish a public key to a key server.
    pub fn send_key(&self, server: &str, key_id: &str) -> Result<()> {
        info!(server = %server, key_id = %key_id, "sending public key");
        self.run(&["--keyserver", server, "--send-keys", key_id])?;
        Ok(())
    }

    /// Import a public key from a key server; returns gpg's report.
    pub fn receive_key(&self, server: &str, key_id: &str) -> Result<String> {
        info!(server = %server, key_id = %key_id, "receiving public key");
        let output = self.run(&["--keyserver", server, "--recv-keys", key_id])?;
        // gpg reports imports on stderr
        let mut report = String::from_utf8_lossy(&output.stdout).to_string();
        report.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok(report)
    }

    /// ASCII-armored public key block.
    pub fn export_armored(&self, key_id: &str) -> Result<String> {
        let output = self.run(&["--armor", "--export", key_id])?;
        let armored = String::from_utf8_lossy(&output.stdout).to_string();
        if armored.trim().is_empty() {
            return Err(KeysError::GpgCommandFailed {
                command: format!("--armor --export {key_id}"),
                stderr: "no public key exported".to_string(),
            });
        }
        Ok(armored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_gpg_is_reported() {
        let gpg = Gpg::new("/nonexistent/bin/gpg");
        assert!(matches!(gpg.dialect(), Err(KeysError::GpgNotFound(_))));
        assert!(matches!(
            gpg.list_secret_keys(),
            Err(KeysError::GpgNotFound(_))
        ));
    }
}
