//! Error types for contributor-keys

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the contributor key workflows.
#[derive(Error, Debug)]
pub enum KeysError {
    /// gpg binary not found
    #[error("gpg is not installed or not in PATH ({0})")]
    GpgNotFound(PathBuf),

    /// gpg exited with a failure status
    #[error("gpg {command} failed: {stderr}")]
    GpgCommandFailed { command: String, stderr: String },

    /// git binary not found
    #[error("git is not installed or not in PATH ({0})")]
    GitNotFound(PathBuf),

    /// git exited with a failure status
    #[error("git {command} failed: {stderr}")]
    GitCommandFailed { command: String, stderr: String },

    /// No manifest at the expected location
    #[error("contributor manifest not found at {0}")]
    ManifestNotFound(PathBuf),

    /// Manifest is not a JSON object or has a malformed contributor list
    #[error("invalid contributor manifest: {0}")]
    InvalidManifest(String),

    /// Contributor key field is not `<server>#<key-id>`
    #[error("contributor {name} key field is invalid: {value:?}")]
    InvalidKeyReference { name: String, value: String },

    /// Neither an explicit value nor git config provided this identity field
    #[error("no {0} given and none configured in git")]
    MissingIdentity(&'static str),

    /// No secret key matches the contributor's email
    #[error("no secret key found for {email}")]
    NoSecretKey { email: String },

    /// `user.signingkey` is not set
    #[error("no signing key configured (git config user.signingkey)")]
    SigningKeyNotConfigured,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for contributor key operations.
pub type Result<T> = std::result::Result<T, KeysError>;
