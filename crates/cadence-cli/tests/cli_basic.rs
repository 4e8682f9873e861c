//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run against the dev data directory
//! and verify outputs.

use std::process::Command;

/// Run a CLI command and return (exit code, stdout, stderr).
fn run_cli(args: &[&str]) -> (i32, String, String) {
    let output = Command::new("cargo")
        .args(["run", "-p", "cadence-cli", "--"])
        .args(args)
        .env("CADENCE_ENV", "dev")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (code, stdout, stderr)
}

#[test]
fn test_habit_list() {
    let (code, stdout, _) = run_cli(&["habit", "list"]);
    assert_eq!(code, 0, "habit list failed");
    assert!(serde_json::from_str::<serde_json::Value>(&stdout).is_ok());
}

#[test]
fn test_config_show() {
    let (code, stdout, _) = run_cli(&["config", "show"]);
    assert_eq!(code, 0, "config show failed");
    assert!(stdout.contains("strategy"));
}

#[test]
fn test_challenge_show_empty_week_is_ok() {
    let (code, stdout, _) = run_cli(&["challenge", "show", "--date", "2020-01-01"]);
    assert_eq!(code, 0, "challenge show failed");
    assert!(serde_json::from_str::<serde_json::Value>(&stdout).is_ok());
}

#[test]
fn test_completions_emit_script() {
    let (code, stdout, _) = run_cli(&["completions", "bash"]);
    assert_eq!(code, 0, "completions failed");
    assert!(stdout.contains("cadence-cli"));
}

#[test]
fn test_unknown_pillar_fails() {
    let (code, _, stderr) = run_cli(&[
        "okr", "add", "vigor", "x", "--start", "2026-07-01", "--end", "2026-09-30",
    ]);
    assert_ne!(code, 0);
    assert!(stderr.contains("unknown pillar"));
}
