//! The collaborator workflows: `join`, `sync` and `export`.
//!
//! Each workflow receives what it needs explicitly (gpg and git handles, the
//! loaded manifest) and never touches shared state. Writing the manifest back
//! is left to the caller.

use serde::Serialize;
use tracing::{info, warn};

use crate::error::KeysError;
use crate::git_config::GitConfig;
use crate::gpg::Gpg;
use crate::hosting::key_settings_link;
use crate::manifest::{
    Contributor, ContributorManifest, KeyReference, UpsertOutcome, DEFAULT_KEY_SERVER,
};
use crate::Result;

// ── join ──────────────────────────────────────────────────────────────────

/// Inputs for enrolling the current user. Unset identity fields fall back to
/// git config.
#[derive(Debug, Clone)]
pub struct JoinRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    /// Secret key to use; picked by email from the keyring when unset.
    pub key_id: Option<String>,
    pub key_server: String,
}

impl Default for JoinRequest {
    fn default() -> Self {
        Self {
            name: None,
            email: None,
            key_id: None,
            key_server: DEFAULT_KEY_SERVER.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct JoinOutcome {
    pub contributor: Contributor,
    pub upsert: UpsertOutcome,
}

fn resolve_identity(
    explicit: Option<String>,
    git: &GitConfig,
    key: &str,
    field: &'static str,
) -> Result<String> {
    match explicit.filter(|v| !v.trim().is_empty()) {
        Some(value) => Ok(value),
        None => git.get(key)?.ok_or(KeysError::MissingIdentity(field)),
    }
}

/// Enroll an existing secret key: publish it, configure the repository to
/// sign with it and record it in the manifest.
pub fn join(
    gpg: &Gpg,
    git: &GitConfig,
    manifest: &mut ContributorManifest,
    request: JoinRequest,
) -> Result<JoinOutcome> {
    let name = resolve_identity(request.name, git, "user.name", "name")?;
    let email = resolve_identity(request.email, git, "user.email", "email")?;

    let key_id = match request.key_id {
        Some(id) => id,
        None => {
            let keys = gpg.list_secret_keys()?;
            let mut matching = keys.into_iter().filter(|k| k.matches_email(&email));
            let key = matching
                .next()
                .ok_or_else(|| KeysError::NoSecretKey {
                    email: email.clone(),
                })?;
            if matching.next().is_some() {
                warn!(email = %email, chosen = %key.id, "several secret keys match; using the first");
            }
            key.id
        }
    };

    gpg.send_key(&request.key_server, &key_id)?;
    git.configure_signing(&name, &email, &key_id)?;

    let contributor = Contributor::new(
        name,
        email,
        Some(KeyReference::new(request.key_server, key_id)),
    );
    let upsert = manifest.upsert(contributor.clone());
    info!(name = %contributor.name, ?upsert, "contributor joined");

    Ok(JoinOutcome {
        contributor,
        upsert,
    })
}

// ── sync ──────────────────────────────────────────────────────────────────

/// One key to import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncTarget {
    pub name: String,
    pub key: KeyReference,
}

/// Keys to fetch, in manifest order. Contributors without a key are
/// skipped; a malformed key field fails the whole plan before anything is
/// fetched.
pub fn plan_sync(manifest: &ContributorManifest) -> Result<Vec<SyncTarget>> {
    manifest
        .contributors()
        .filter_map(|c| {
            c.key_reference().map(|key| {
                key.map(|key| SyncTarget {
                    name: c.name.clone(),
                    key,
                })
            })
        })
        .collect()
}

/// Import every contributor key. `on_fetch` runs before each import.
pub fn sync(
    gpg: &Gpg,
    manifest: &ContributorManifest,
    mut on_fetch: impl FnMut(&SyncTarget),
) -> Result<Vec<(SyncTarget, String)>> {
    let targets = plan_sync(manifest)?;
    let mut imported = Vec::with_capacity(targets.len());
    for target in targets {
        on_fetch(&target);
        let report = gpg.receive_key(&target.key.server, &target.key.key_id)?;
        imported.push((target, report));
    }
    Ok(imported)
}

// ── export ────────────────────────────────────────────────────────────────

/// The configured signing key, ready to be pasted into a hosting provider.
#[derive(Debug, Clone, Serialize)]
pub struct ExportedKey {
    pub key_id: String,
    pub armored: String,
    /// Key settings page of the `origin` remote's provider, when known.
    pub settings_url: Option<String>,
}

/// Export the public half of `user.signingkey`.
pub fn export(gpg: &Gpg, git: &GitConfig) -> Result<ExportedKey> {
    let key_id = git
        .get("user.signingkey")?
        .ok_or(KeysError::SigningKeyNotConfigured)?;
    let armored = gpg.export_armored(&key_id)?;
    let settings_url = git
        .origin_url()?
        .as_deref()
        .and_then(key_settings_link);

    Ok(ExportedKey {
        key_id,
        armored,
        settings_url,
    })
}
