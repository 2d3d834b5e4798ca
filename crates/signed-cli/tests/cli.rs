//! End-to-end runs of the `git-signed` binary.

use std::path::Path;
use std::process::{Command, Output};

fn run_git(repo_dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(repo_dir)
        .output()
        .unwrap();
    assert!(output.status.success(), "git {args:?} failed");
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn make_git_repo() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    run_git(dir.path(), &["init"]);
    run_git(dir.path(), &["config", "user.name", "Test User"]);
    run_git(dir.path(), &["config", "user.email", "test@example.com"]);
    run_git(dir.path(), &["config", "commit.gpgsign", "false"]);
    dir
}

fn commit(repo_dir: &Path, message: &str) -> String {
    run_git(repo_dir, &["commit", "--allow-empty", "-m", message]);
    run_git(repo_dir, &["rev-parse", "--short", "HEAD"])
}

fn git_signed(repo_dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_git-signed"))
        .arg("-C")
        .arg(repo_dir)
        .args(args)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

#[test]
fn unsigned_commits_fail_with_guidance() {
    let repo = make_git_repo();
    let hash = commit(repo.path(), "WIP");

    let out = git_signed(repo.path(), &[]);
    let stderr = String::from_utf8_lossy(&out.stderr);

    assert_eq!(out.status.code(), Some(1));
    assert!(out.stdout.is_empty());
    assert!(stderr.contains("The following commits are not signed"));
    assert!(stderr.contains(&format!("{hash} Test User\tWIP")));
    assert!(stderr.contains("git-signed join"));
}

#[test]
fn empty_range_passes() {
    let repo = make_git_repo();
    commit(repo.path(), "first");
    let head = commit(repo.path(), "second");

    let out = git_signed(repo.path(), &[&head]);
    assert_eq!(out.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&out.stdout).contains("All commits are signed"));
}

#[test]
fn relative_revision_limits_range() {
    let repo = make_git_repo();
    let first = commit(repo.path(), "first");
    let second = commit(repo.path(), "second");

    let out = git_signed(repo.path(), &["HEAD~1"]);
    let stderr = String::from_utf8_lossy(&out.stderr);

    assert_eq!(out.status.code(), Some(1));
    assert!(stderr.contains(&format!("{second} Test User\tsecond")));
    assert!(!stderr.contains(&first));
}

#[test]
fn tag_as_range_start() {
    let repo = make_git_repo();
    commit(repo.path(), "released");
    run_git(repo.path(), &["tag", "v1.0.0"]);

    let out = git_signed(repo.path(), &["v1.0.0"]);
    assert_eq!(out.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&out.stdout).contains("All commits are signed"));

    let unreleased = commit(repo.path(), "unreleased");
    let out = git_signed(repo.path(), &["v1.0.0", "--format", "json"]);
    let report: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(out.status.code(), Some(1));
    assert_eq!(report["summary"]["total"], 1);
    assert_eq!(report["sections"][1]["commits"][0]["hash"], unreleased.as_str());
}

#[test]
fn unknown_revision_is_rejected_by_git() {
    let repo = make_git_repo();
    commit(repo.path(), "first");

    let out = git_signed(repo.path(), &["no-such-branch"]);
    assert_eq!(out.status.code(), Some(128));
    assert!(out.stdout.is_empty());
}

#[test]
fn json_report_on_stdout() {
    let repo = make_git_repo();
    commit(repo.path(), "WIP");

    let out = git_signed(repo.path(), &["--format", "json"]);
    assert_eq!(out.status.code(), Some(1));

    let report: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(report["passed"], false);
    assert_eq!(report["summary"]["total"], 1);
    assert_eq!(report["sections"][1]["kind"], "unsigned");
}

#[test]
fn git_failure_status_is_propagated() {
    let repo = make_git_repo();
    commit(repo.path(), "first");

    // an unknown revision makes git log exit 128
    let out = git_signed(repo.path(), &["deadbeefdeadbeef"]);
    assert_eq!(out.status.code(), Some(128));
    assert!(out.stdout.is_empty());
}

#[test]
fn missing_git_program_exits_one() {
    let repo = make_git_repo();
    let out = git_signed(repo.path(), &["--git", "/nonexistent/bin/git"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("/nonexistent/bin/git"));
}

#[test]
fn usage_errors_exit_one_and_help_exits_zero() {
    let repo = make_git_repo();
    assert_eq!(git_signed(repo.path(), &["--frobnicate"]).status.code(), Some(1));
    assert_eq!(git_signed(repo.path(), &["--", "-p"]).status.code(), Some(1));
    assert_eq!(git_signed(repo.path(), &["--help"]).status.code(), Some(0));
}

#[test]
fn export_without_signing_key_fails() {
    let repo = make_git_repo();
    let out = git_signed(repo.path(), &["export"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("no signing key configured"));
}
