//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run against an isolated HOME so
//! they never touch the developer's real data directory.

use std::path::Path;
use std::process::Command;

/// Run a CLI command with HOME pointed at `home` and return output.
fn run_cli(home: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new("cargo")
        .args(["run", "-p", "lectern-cli", "--quiet", "--"])
        .args(args)
        .env("HOME", home)
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

#[test]
fn test_reminder_add_and_list() {
    let home = tempfile::tempdir().unwrap();
    let at = (chrono::Utc::now() + chrono::Duration::hours(2)).to_rfc3339();

    let (stdout, stderr, code) = run_cli(
        home.path(),
        &[
            "reminder",
            "add",
            "--lecture-id",
            "lec-1",
            "--user-id",
            "user-1",
            "--at",
            &at,
            "--message",
            "Lecture starts soon",
        ],
    );
    assert_eq!(code, 0, "add failed: {stderr}");
    assert!(stdout.contains("lec-1"));

    let (stdout, stderr, code) = run_cli(home.path(), &["reminder", "list"]);
    assert_eq!(code, 0, "list failed: {stderr}");
    assert!(stdout.contains("Lecture starts soon"));
}

#[test]
fn test_reminder_cleanup_empty_store() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, stderr, code) = run_cli(home.path(), &["reminder", "cleanup"]);
    assert_eq!(code, 0, "cleanup failed: {stderr}");
    assert!(stdout.contains("\"removed\": 0"));
}

#[test]
fn test_config_get_default_grace() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["config", "get", "timing.grace_minutes"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "10");
}

#[test]
fn test_config_set_roundtrip() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(
        home.path(),
        &["config", "set", "timing.lead_minutes", "15"],
    );
    assert_eq!(code, 0, "set failed: {stderr}");

    let (stdout, _, code) = run_cli(home.path(), &["config", "get", "timing.lead_minutes"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "15");
}

#[test]
fn test_unknown_config_key_fails() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["config", "get", "timing.nope"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("unknown config key"));
}
