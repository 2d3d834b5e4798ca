//! contributor-keys: the collaborator workflows around git-signed
//!
//! The audit engine only reads signature status from git. The trust material
//! it relies on is put in place by the workflows in this crate:
//!
//! - `join`: publish your key, configure signing, record yourself in the
//!   contributor manifest
//! - `sync`: import every contributor's public key from its key server
//! - `export`: print your public key with a link to the hosting provider's
//!   key settings page
//!
//! Key generation is out of scope; `join` enrolls an existing secret key.

pub mod error;
pub mod git_config;
pub mod gpg;
pub mod hosting;
pub mod listing;
pub mod manifest;
pub mod workflows;

pub use error::{KeysError, Result};
pub use git_config::GitConfig;
pub use gpg::Gpg;
pub use hosting::{key_settings_link, remote_host, HostingProvider};
pub use listing::{parser_for, KeyListingDialect, KeyListingParser, SecretKey};
pub use manifest::{
    Contributor, ContributorEntry, ContributorManifest, KeyReference, UpsertOutcome,
    DEFAULT_KEY_SERVER, DEFAULT_MANIFEST,
};
pub use workflows::{
    export, join, plan_sync, sync, ExportedKey, JoinOutcome, JoinRequest, SyncTarget,
};
