//! Argument handling and startup checks.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn ferry(dir: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("ferry"));
    cmd.current_dir(dir.path()).env_remove("FERRY_INVENTORY");
    cmd
}

#[test]
fn test_help_lists_subcommands() {
    let dir = TempDir::new().unwrap();
    ferry(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("build"))
        .stdout(predicate::str::contains("init"));
}

#[test]
fn test_version_prints_package_version() {
    let dir = TempDir::new().unwrap();
    ferry(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_no_arguments_prints_usage() {
    let dir = TempDir::new().unwrap();
    ferry(&dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_build_help_shows_aliases() {
    let dir = TempDir::new().unwrap();
    ferry(&dir)
        .args(["build", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--jobs"))
        .stdout(predicate::str::contains("-j"))
        .stdout(predicate::str::contains("--build"));
}

#[test]
fn test_missing_token_is_fatal_before_anything_runs() {
    let dir = TempDir::new().unwrap();
    ferry(&dir)
        .args(["build", "-j", "deploy", "-b", "build.yaml"])
        .env_remove("DO_TOKEN")
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "You must set a DO_TOKEN environment variable to run this app.",
        ));
}

#[test]
fn test_empty_token_is_missing() {
    let dir = TempDir::new().unwrap();
    ferry(&dir)
        .args(["init", "-b", "build.yaml"])
        .env("DO_TOKEN", "")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("DO_TOKEN"));
}

#[test]
fn test_token_from_dotenv_file() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join(".env"), "DO_TOKEN=from-dotenv\n").unwrap();
    // Passes the credential check and fails later on the missing build file.
    ferry(&dir)
        .args(["build", "-j", "deploy", "-b", "missing.yaml"])
        .env_remove("DO_TOKEN")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("missing.yaml"))
        .stderr(predicate::str::contains("DO_TOKEN").not());
}

#[test]
fn test_no_color_accepts_conventional_values() {
    let dir = TempDir::new().unwrap();
    for value in ["1", "yes", "0", ""] {
        ferry(&dir)
            .args(["build", "-j", "deploy", "-b", "missing.yaml"])
            .env("DO_TOKEN", "test-token")
            .env("NO_COLOR", value)
            .assert()
            .code(1)
            .stderr(predicate::str::contains("reading missing.yaml"));
    }
}
