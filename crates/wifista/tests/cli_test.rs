//! Integration tests for the `wifista` CLI binary.
//!
//! Everything runs against the simulated radio, with the config directory
//! pointed away from the user's real configuration.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

const NONEXISTENT_HOME: &str = "/tmp/wifista-cli-test-nonexistent";

/// Build a [`Command`] for the `wifista` binary with env isolation.
fn wifista_cmd_in(home: &str) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("wifista");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("WIFISTA_PROFILE")
        .env_remove("WIFISTA_OUTPUT")
        .env_remove("WIFISTA_PASSPHRASE");
    cmd
}

fn wifista_cmd() -> assert_cmd::Command {
    wifista_cmd_in(NONEXISTENT_HOME)
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = wifista_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    wifista_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("simulate")
            .and(predicate::str::contains("config"))
            .and(predicate::str::contains("completions")),
    );
}

#[test]
fn test_version_flag() {
    wifista_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("wifista"));
}

#[test]
fn test_completions_zsh() {
    wifista_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

// ── Simulate ────────────────────────────────────────────────────────

#[test]
fn test_simulate_connects_and_reports_json() {
    let output = wifista_cmd()
        .env("WIFISTA_PASSPHRASE", "correct-horse")
        .args(["simulate", "--ssid", "lab", "--latency-ms", "1", "-o", "json"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["ssid"], "lab");
    assert_eq!(report["state"], "connected");
    assert_eq!(report["ip"], "192.168.1.100");
    assert_eq!(report["reconnect_count"], 0);
    assert_eq!(report["connect_requests"], 1);
}

#[test]
fn test_simulate_recovers_after_disconnects() {
    wifista_cmd()
        .env("WIFISTA_PASSPHRASE", "correct-horse")
        .args([
            "sim",
            "--ssid",
            "lab",
            "--attempt",
            "disconnect",
            "--attempt",
            "disconnect:auth-fail",
            "--attempt",
            "got-ip:10.0.0.7",
            "--max-reconnect",
            "5",
            "--latency-ms",
            "1",
            "-o",
            "plain",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("10.0.0.7"));
}

#[test]
fn test_simulate_exhausted_budget_exits_connection() {
    let output = wifista_cmd()
        .env("WIFISTA_PASSPHRASE", "correct-horse")
        .args([
            "simulate",
            "--ssid",
            "lab",
            "--attempt",
            "disconnect",
            "--max-reconnect",
            "2",
            "--latency-ms",
            "1",
        ])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(7), "{}", combined_output(&output));
    let text = combined_output(&output);
    assert!(text.contains("after 2 reconnect attempts"), "{text}");
}

#[test]
fn test_simulate_silent_radio_times_out() {
    let output = wifista_cmd()
        .env("WIFISTA_PASSPHRASE", "correct-horse")
        .args([
            "simulate",
            "--ssid",
            "lab",
            "--attempt",
            "silent",
            "--fallback",
            "silent",
            "--timeout",
            "1",
        ])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(8), "{}", combined_output(&output));
}

#[test]
fn test_simulate_setup_failure_exits_general() {
    let output = wifista_cmd()
        .env("WIFISTA_PASSPHRASE", "correct-horse")
        .args(["simulate", "--ssid", "lab", "--fail-at", "radio-start"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let text = combined_output(&output);
    assert!(text.contains("radio-start"), "{text}");
}

#[test]
fn test_simulate_rejected_connect_exits_connection() {
    let output = wifista_cmd()
        .env("WIFISTA_PASSPHRASE", "correct-horse")
        .args(["simulate", "--ssid", "lab", "--fail-at", "connect", "--latency-ms", "1"])
        .timeout(std::time::Duration::from_secs(30))
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(7), "{}", combined_output(&output));
}

#[test]
fn test_simulate_without_ssid_is_usage_error() {
    let output = wifista_cmd().arg("simulate").output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("No network configured"), "{text}");
}

#[test]
fn test_simulate_unknown_profile_is_not_found() {
    let output = wifista_cmd()
        .args(["simulate", "--ssid", "lab", "--profile", "nowhere"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4));
}

#[test]
fn test_simulate_without_passphrase_is_auth_error() {
    let home = tempfile::tempdir().unwrap();
    let home = home.path().to_str().unwrap();
    wifista_cmd_in(home)
        .args(["config", "set", "ssid", "attic"])
        .assert()
        .success();

    let output = wifista_cmd_in(home).arg("simulate").output().unwrap();
    let text = combined_output(&output);
    assert_eq!(output.status.code(), Some(3), "{text}");
    assert!(text.contains("No passphrase configured"), "{text}");
}

#[test]
fn test_simulate_rejects_malformed_attempt() {
    let output = wifista_cmd()
        .args(["simulate", "--ssid", "lab", "--attempt", "reboot"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_simulate_rejects_unknown_fault() {
    let output = wifista_cmd()
        .args(["simulate", "--ssid", "lab", "--fail-at", "power-cycle"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_path_prints_location() {
    wifista_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_set_then_simulate_from_profile() {
    let home = tempfile::tempdir().unwrap();
    let home = home.path().to_str().unwrap();

    wifista_cmd_in(home)
        .args(["config", "set", "ssid", "attic"])
        .assert()
        .success();
    wifista_cmd_in(home)
        .args(["config", "set", "max-reconnect-count", "3"])
        .assert()
        .success();

    wifista_cmd_in(home)
        .args(["config", "profiles", "-o", "plain"])
        .assert()
        .success()
        .stdout(predicate::str::contains("default"));

    let output = wifista_cmd_in(home)
        .env("WIFISTA_PASSPHRASE", "correct-horse")
        .args(["simulate", "--latency-ms", "1", "-o", "json-compact"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["ssid"], "attic");
}

#[test]
fn test_config_defaults_choose_output_format() {
    let home = tempfile::tempdir().unwrap();
    let home = home.path().to_str().unwrap();

    let path = wifista_cmd_in(home).args(["config", "path"]).output().unwrap();
    let path = std::path::PathBuf::from(String::from_utf8(path.stdout).unwrap().trim());
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "[defaults]\noutput = \"json\"\ncolor = \"never\"\n").unwrap();

    let output = wifista_cmd_in(home)
        .env("WIFISTA_PASSPHRASE", "correct-horse")
        .args(["simulate", "--ssid", "lab", "--latency-ms", "1"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["state"], "connected");

    wifista_cmd_in(home)
        .env("WIFISTA_PASSPHRASE", "correct-horse")
        .args(["simulate", "--ssid", "lab", "--latency-ms", "1", "-o", "plain"])
        .assert()
        .success()
        .stdout(predicate::str::contains("192.168.1.100"));
}

#[test]
fn test_config_set_unknown_key_is_usage_error() {
    let home = tempfile::tempdir().unwrap();
    let output = wifista_cmd_in(home.path().to_str().unwrap())
        .args(["config", "set", "colour", "blue"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_config_use_unknown_profile_is_not_found() {
    let output = wifista_cmd()
        .args(["config", "use", "nowhere"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4));
}
