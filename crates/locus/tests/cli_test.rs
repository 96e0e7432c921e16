//! Integration tests for the `locus` binary.
//!
//! Argument parsing, `check` output, and configuration exit codes. No test
//! binds a port or reaches a collaborator.
#![allow(clippy::unwrap_used)]

use std::io::Write as _;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::NamedTempFile;

// ── Helpers ─────────────────────────────────────────────────────────

/// `locus` with config discovery pointed at a nonexistent directory and
/// the known `LOCUS_*` overrides removed.
fn locus_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("locus");
    cmd.env("HOME", "/tmp/locus-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/locus-cli-test-nonexistent")
        .env_remove("LOCUS_CONFIG")
        .env_remove("LOCUS_BIND")
        .env_remove("LOCUS_TELEGRAM__BOT_TOKEN")
        .env_remove("LOCUS_TELEGRAM__CHAT_ID")
        .env_remove("LOCUS_IP2LOCATION__API_KEY")
        .env_remove("RUST_LOG");
    cmd
}

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

const COMPLETE: &str = r#"
bind = "127.0.0.1:18080"

[telegram]
bot_token = "999:super-secret-token"
chat_id = -100123

[ip2location]
api_key = "ip-secret-key"
"#;

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    locus_cmd()
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_help_lists_commands() {
    locus_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("serve")
            .and(predicate::str::contains("check"))
            .and(predicate::str::contains("--log-format")),
    );
}

// ── check ───────────────────────────────────────────────────────────

#[test]
fn test_check_prints_redacted_summary() {
    let file = config_file(COMPLETE);

    locus_cmd()
        .arg("check")
        .arg("--config")
        .arg(file.path())
        .assert()
        .success()
        .stdout(
            predicate::str::contains("chat_id = \"-100123\"")
                .and(predicate::str::contains("<redacted>"))
                .and(predicate::str::contains("# ok"))
                .and(predicate::str::contains("super-secret-token").not())
                .and(predicate::str::contains("ip-secret-key").not()),
        );
}

#[test]
fn test_check_reads_credentials_from_environment() {
    let file = config_file(
        r#"
[telegram]
chat_id = "42"
"#,
    );

    locus_cmd()
        .arg("check")
        .arg("--config")
        .arg(file.path())
        .env("LOCUS_TELEGRAM__BOT_TOKEN", "1:env-token")
        .env("LOCUS_IP2LOCATION__API_KEY", "env-key")
        .assert()
        .success()
        .stdout(predicate::str::contains("env-token").not());
}

#[test]
fn test_missing_credential_exits_with_config_code() {
    let file = config_file(
        r#"
[telegram]
bot_token = "1:abc"
chat_id = "42"
"#,
    );

    locus_cmd()
        .arg("check")
        .arg("--config")
        .arg(file.path())
        .assert()
        .code(3)
        .stderr(predicate::str::contains("ip2location.api_key"));
}

#[test]
fn test_missing_config_file_exits_with_config_code() {
    locus_cmd()
        .args(["check", "--config", "/tmp/locus-cli-test-nonexistent/none.toml"])
        .assert()
        .code(3);
}

#[test]
fn test_serve_refuses_to_start_without_credentials() {
    let file = config_file("bind = \"127.0.0.1:0\"\n");

    locus_cmd()
        .arg("serve")
        .arg("--config")
        .arg(file.path())
        .assert()
        .code(3)
        .stderr(predicate::str::contains("telegram.chat_id"));
}
