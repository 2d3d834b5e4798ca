//! Workflow tests against a real git repository and a scripted gpg.

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::Command;

use contributor_keys::{
    export, join, sync, ContributorManifest, GitConfig, Gpg, JoinRequest, KeysError,
    UpsertOutcome,
};
use tempfile::TempDir;

const PACKAGE: &str = r#"{
  "name": "demo",
  "contributors": [
    { "name": "Bob", "email": "bob@example.com", "key": "hkp://keys.example.org#BBBB2222" },
    { "name": "Carol", "email": "carol@example.com" }
  ]
}
"#;

/// A gpg stand-in that records its arguments to `calls.log` next to itself.
fn fake_gpg(dir: &Path) -> PathBuf {
    let script = r#"#!/bin/sh
here=$(dirname "$0")
echo "$*" >> "$here/calls.log"
case "$*" in
  --version)
    echo "gpg (GnuPG) 2.2.27"
    ;;
  --list-secret-keys)
    echo "sec   rsa4096 2020-01-01 [SC]"
    echo "      ABCDEF0123456789ABCDEF0123456789ABCDEF01"
    echo "uid           [ultimate] Alice <alice@example.com>"
    echo "ssb   rsa4096 2020-01-01 [E]"
    echo ""
    ;;
  *--send-keys*)
    ;;
  *--recv-keys*)
    echo "gpg: key imported" >&2
    ;;
  "--armor --export"*)
    echo "-----BEGIN PGP PUBLIC KEY BLOCK-----"
    echo "mQINBF..."
    echo "-----END PGP PUBLIC KEY BLOCK-----"
    ;;
  *)
    exit 2
    ;;
esac
"#;
    let path = dir.join("gpg");
    std::fs::write(&path, script).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn calls(dir: &Path) -> Vec<String> {
    std::fs::read_to_string(dir.join("calls.log"))
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}

struct Fixture {
    repo: TempDir,
    bin: TempDir,
    gpg: Gpg,
    git: GitConfig,
}

fn fixture() -> Fixture {
    let repo = tempfile::tempdir().unwrap();
    let bin = tempfile::tempdir().unwrap();
    let out = Command::new("git")
        .arg("init")
        .current_dir(repo.path())
        .output()
        .unwrap();
    assert!(out.status.success());
    std::fs::write(repo.path().join("package.json"), PACKAGE).unwrap();

    let gpg = Gpg::new(fake_gpg(bin.path()));
    let git = GitConfig::new("git", Some(repo.path().to_path_buf()));
    Fixture { repo, bin, gpg, git }
}

#[test]
fn test_join_enrolls_key_matching_email() {
    let f = fixture();
    let manifest_path = f.repo.path().join("package.json");
    let mut manifest = ContributorManifest::load(&manifest_path).unwrap();

    let outcome = join(
        &f.gpg,
        &f.git,
        &mut manifest,
        JoinRequest {
            name: Some("Alice".to_string()),
            email: Some("alice@example.com".to_string()),
            key_id: None,
            key_server: "hkp://keys.example.org".to_string(),
        },
    )
    .unwrap();
    manifest.save().unwrap();

    assert_eq!(outcome.upsert, UpsertOutcome::Added);
    assert_eq!(
        outcome.contributor.key.as_deref(),
        Some("hkp://keys.example.org#ABCDEF0123456789ABCDEF0123456789ABCDEF01")
    );
    assert!(calls(f.bin.path()).contains(
        &"--keyserver hkp://keys.example.org --send-keys ABCDEF0123456789ABCDEF0123456789ABCDEF01"
            .to_string()
    ));
    assert_eq!(
        f.git.get("user.signingkey").unwrap().as_deref(),
        Some("ABCDEF0123456789ABCDEF0123456789ABCDEF01")
    );
    assert_eq!(f.git.get("commit.gpgsign").unwrap().as_deref(), Some("true"));

    let reloaded = ContributorManifest::load(&manifest_path).unwrap();
    let names: Vec<_> = reloaded.contributors().map(|c| c.name.clone()).collect();
    assert_eq!(names, vec!["Bob", "Carol", "Alice"]);
}

#[test]
fn test_join_uses_git_identity_when_not_given() {
    let f = fixture();
    f.git.set("user.name", "Alice").unwrap();
    f.git.set("user.email", "alice@example.com").unwrap();
    let mut manifest = ContributorManifest::load(f.repo.path().join("package.json")).unwrap();

    let outcome = join(&f.gpg, &f.git, &mut manifest, JoinRequest::default()).unwrap();
    assert_eq!(outcome.contributor.name, "Alice");
    assert_eq!(outcome.contributor.email, "alice@example.com");
}

#[test]
fn test_join_without_matching_key_changes_nothing() {
    let f = fixture();
    let mut manifest = ContributorManifest::load(f.repo.path().join("package.json")).unwrap();

    let err = join(
        &f.gpg,
        &f.git,
        &mut manifest,
        JoinRequest {
            name: Some("Dave".to_string()),
            email: Some("dave@example.com".to_string()),
            ..JoinRequest::default()
        },
    )
    .unwrap_err();

    assert!(matches!(err, KeysError::NoSecretKey { .. }));
    assert_eq!(manifest.contributors().count(), 2);
    assert_eq!(f.git.get("user.signingkey").unwrap(), None);
    assert!(!calls(f.bin.path()).iter().any(|c| c.contains("--send-keys")));
}

#[test]
fn test_sync_fetches_each_key_in_order() {
    let f = fixture();
    let manifest = ContributorManifest::load(f.repo.path().join("package.json")).unwrap();

    let mut seen = Vec::new();
    let imported = sync(&f.gpg, &manifest, |target| seen.push(target.name.clone())).unwrap();

    assert_eq!(seen, vec!["Bob"]);
    assert_eq!(imported.len(), 1);
    assert!(imported[0].1.contains("key imported"));
    assert!(calls(f.bin.path())
        .contains(&"--keyserver hkp://keys.example.org --recv-keys BBBB2222".to_string()));
}

#[test]
fn test_export_requires_signing_key() {
    let f = fixture();
    assert!(matches!(
        export(&f.gpg, &f.git),
        Err(KeysError::SigningKeyNotConfigured)
    ));
}

#[test]
fn test_export_links_hosting_provider() {
    let f = fixture();
    f.git.set("user.signingkey", "ABCD1234").unwrap();
    f.git
        .set("remote.origin.url", "git@github.com:acme/widgets.git")
        .unwrap();

    let exported = export(&f.gpg, &f.git).unwrap();
    assert_eq!(exported.key_id, "ABCD1234");
    assert!(exported.armored.starts_with("-----BEGIN PGP PUBLIC KEY BLOCK-----"));
    assert_eq!(
        exported.settings_url.as_deref(),
        Some("https://github.com/settings/keys")
    );
}
