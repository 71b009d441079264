//! Tests for error handling and CLI flags.

use crate::support::*;
use predicates::prelude::*;

#[test]
fn test_help() {
    let t = Test::new();
    t.cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage").and(predicate::str::contains("encrypt")));
}

#[test]
fn test_unknown_command_fails() {
    let t = Test::new();
    assert_failure(&t.cmd().arg("unknown-command").output().unwrap());
}

#[test]
fn test_version_flag() {
    let t = Test::new();
    let output = t.cmd().arg("--version").output().unwrap();
    assert_success(&output);
    assert!(stdout(&output).contains("cfgseal"));
}

#[test]
fn test_encrypt_without_config_exits_100() {
    let t = Test::new();
    let output = t.encrypt("storage", "v");
    assert_exit_code(&output, 100);
    assert_stderr_contains(&output, "not support algorithm");
}

#[test]
fn test_missing_explicit_config() {
    let t = Test::new();
    let output = t
        .cmd()
        .args(["decrypt", "v", "--config", "missing.json"])
        .output()
        .unwrap();
    assert_exit_code(&output, 200);
    assert_stderr_contains(&output, "config file not found");
    assert_stderr_contains(&output, "CFGSEAL_CONFIG");
}

#[test]
fn test_malformed_config_is_reported() {
    let t = Test::with_config("{ not json");
    let output = t.hash("x");
    assert_exit_code(&output, 1);
    assert_stderr_contains(&output, "failed to parse config");
}

#[test]
fn test_bad_key_exits_100_without_leaking() {
    let t = Test::with_config(r#"{"sdk":{"storage-secret":{"method":"aes-256-gcm","aes_key":"tooshort-key"}}}"#);
    let output = t.encrypt("storage", "v");
    assert_exit_code(&output, 100);
    assert_output_excludes(&output, "tooshort-key");
}

#[test]
fn test_verbose_logs_to_stderr() {
    let t = Test::with_config(&sample_config());
    let output = t
        .cmd()
        .args(["--verbose", "encrypt", "v"])
        .output()
        .unwrap();
    assert_success(&output);
    assert!(stdout_line(&output).starts_with(PREFIX));
    assert_stderr_contains(&output, "building crypto");
}
