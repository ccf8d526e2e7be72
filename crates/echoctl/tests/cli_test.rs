//! Integration tests for the `echoctl` CLI binary.
//!
//! Argument parsing, help output, completions and error exit codes run
//! without any server. The end-to-end tests point `--api-url` at a
//! wiremock server.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `echoctl` binary with env isolation.
///
/// Clears all `ECHOCTL_*` env vars and points home and config directories
/// at `home` so tests never touch the user's real cookie or config.
fn echoctl_cmd(home: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("echoctl");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("ECHOCTL_COOKIE")
        .env_remove("ECHOCTL_COOKIE_FILE")
        .env_remove("ECHOCTL_PROFILE")
        .env_remove("ECHOCTL_API_URL")
        .env_remove("ECHOCTL_CONSOLE_URL")
        .env_remove("ECHOCTL_OUTPUT")
        .env_remove("ECHOCTL_INSECURE")
        .env_remove("ECHOCTL_TIMEOUT");
    cmd
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
    let home = tempfile::tempdir().unwrap();
    let output = echoctl_cmd(home.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    let home = tempfile::tempdir().unwrap();
    echoctl_cmd(home.path()).arg("--help").assert().success().stdout(
        predicate::str::contains("Echo")
            .and(predicate::str::contains("list"))
            .and(predicate::str::contains("volume"))
            .and(predicate::str::contains("tunein"))
            .and(predicate::str::contains("--device")),
    );
}

#[test]
fn test_version_flag() {
    let home = tempfile::tempdir().unwrap();
    echoctl_cmd(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("echoctl"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    let home = tempfile::tempdir().unwrap();
    echoctl_cmd(home.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    let home = tempfile::tempdir().unwrap();
    echoctl_cmd(home.path())
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let home = tempfile::tempdir().unwrap();
    let output = echoctl_cmd(home.path()).arg("dance").output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("dance"));
}

#[test]
fn test_missing_cookie_is_an_auth_error() {
    let home = tempfile::tempdir().unwrap();
    let output = echoctl_cmd(home.path()).arg("list").output().unwrap();
    assert_eq!(output.status.code(), Some(3), "{}", combined_output(&output));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("cookie"), "stderr:\n{stderr}");
}

#[test]
fn test_missing_cookie_file_flag() {
    let home = tempfile::tempdir().unwrap();
    let missing = home.path().join("nope");
    echoctl_cmd(home.path())
        .args(["--cookie-file", missing.to_str().unwrap(), "pause"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cookie file"));
}

#[test]
fn test_volume_out_of_range_is_a_usage_error() {
    let home = tempfile::tempdir().unwrap();
    for level in ["101", "-1"] {
        let output = echoctl_cmd(home.path())
            .args(["volume", level])
            .output()
            .unwrap();
        assert_eq!(output.status.code(), Some(2), "level {level}");
    }
    let output = echoctl_cmd(home.path())
        .args(["volume", "abc"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_shuffle_requires_on_or_off() {
    let home = tempfile::tempdir().unwrap();
    echoctl_cmd(home.path())
        .args(["shuffle", "maybe"])
        .assert()
        .code(2);
}

#[test]
fn test_unknown_profile() {
    let home = tempfile::tempdir().unwrap();
    echoctl_cmd(home.path())
        .args(["--profile", "work", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("work"));
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_path() {
    let home = tempfile::tempdir().unwrap();
    echoctl_cmd(home.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_show_without_cookie() {
    let home = tempfile::tempdir().unwrap();
    echoctl_cmd(home.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("not configured")
                .and(predicate::str::contains("https://layla.amazon.de/")),
        );
}

#[test]
fn test_config_show_never_prints_the_cookie() {
    let home = tempfile::tempdir().unwrap();
    std::fs::write(home.path().join(".alexa-cookie"), "session-token=TOPSECRET; csrf=42\n").unwrap();

    echoctl_cmd(home.path())
        .args(["config", "show", "-o", "json"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("\"csrf\": true")
                .and(predicate::str::contains("session-token"))
                .and(predicate::str::contains("TOPSECRET").not()),
        );
}

// ── End to end against a mock console ───────────────────────────────

async fn mock_console() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/devices-v2/device"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "devices": [
                {
                    "serialNumber": "K1",
                    "deviceType": "A3S5BH2HU6VAYF",
                    "accountName": "Kitchen",
                    "capabilities": ["AUDIO_PLAYER"]
                },
                {
                    "serialNumber": "P0",
                    "deviceType": "A2TF17PFR55MTB",
                    "accountName": "Phone App",
                    "capabilities": []
                },
                {
                    "serialNumber": "O2",
                    "deviceType": "A3S5BH2HU6VAYF",
                    "accountName": "Office",
                    "capabilities": ["AUDIO_PLAYER"]
                }
            ]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/np/player"))
        .and(query_param("deviceSerialNumber", "K1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "playerInfo": { "state": "PLAYING", "infoText": { "title": "Morning Show" } }
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/np/player"))
        .and(query_param("deviceSerialNumber", "O2"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    server
}

/// Run the binary off the async runtime so the mock server keeps serving.
async fn run(mut cmd: assert_cmd::Command) -> std::process::Output {
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

fn console_cmd(home: &Path, server: &MockServer, cookie: &str) -> assert_cmd::Command {
    let cookie_file = home.join("cookie");
    std::fs::write(&cookie_file, cookie).unwrap();

    let mut cmd = echoctl_cmd(home);
    cmd.args([
        "--cookie-file",
        cookie_file.to_str().unwrap(),
        "--api-url",
        &server.uri(),
    ]);
    cmd
}

#[tokio::test(flavor = "multi_thread")]
async fn test_list_plain_degrades_unreadable_devices() {
    let home = tempfile::tempdir().unwrap();
    let server = mock_console().await;

    let mut cmd = console_cmd(home.path(), &server, "session-id=abc; csrf=4242");
    cmd.args(["-o", "plain", "list"]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim_end(), "Kitchen: playing Morning Show\nOffice");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_pause_reports_failed_device_and_exits_one() {
    let home = tempfile::tempdir().unwrap();
    let server = mock_console().await;

    Mock::given(method("POST"))
        .and(path("/api/np/command"))
        .and(query_param("deviceSerialNumber", "O2"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/np/command"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let mut cmd = console_cmd(home.path(), &server, "session-id=abc; csrf=4242");
    cmd.args(["-o", "plain", "pause"]);
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(1), "{}", combined_output(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Kitchen: ok"), "stdout:\n{stdout}");
    assert!(stdout.contains("Office: failed"), "stdout:\n{stdout}");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("1 of 2 devices failed"), "stderr:\n{stderr}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_selected_device_only() {
    let home = tempfile::tempdir().unwrap();
    let server = mock_console().await;

    Mock::given(method("POST"))
        .and(path("/api/np/command"))
        .and(query_param("deviceSerialNumber", "K1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let mut cmd = console_cmd(home.path(), &server, "session-id=abc; csrf=4242");
    cmd.args(["-d", "Kitchen", "-q", "volume", "30"]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    assert!(output.stdout.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unknown_device_exits_not_found() {
    let home = tempfile::tempdir().unwrap();
    let server = mock_console().await;

    let mut cmd = console_cmd(home.path(), &server, "session-id=abc; csrf=4242");
    cmd.args(["-d", "Garage", "play"]);
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(4), "{}", combined_output(&output));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_cookie_without_csrf_exits_auth() {
    let home = tempfile::tempdir().unwrap();
    let server = mock_console().await;

    let mut cmd = console_cmd(home.path(), &server, "session-id=abc");
    cmd.arg("next");
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(3), "{}", combined_output(&output));
    let posts = server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.method.as_str() == "POST")
        .count();
    assert_eq!(posts, 0);
}
