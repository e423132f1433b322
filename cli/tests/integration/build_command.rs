//! `ferry build` failures that stop before any remote call.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const BUILD_FILE: &str = "\
jobs:
  deploy:
    - command: ls -al
    - apt: nginx
";

const INVENTORY: &str =
    "[all]\n192.0.2.10 ansible_user=root ansible_ssh_private_key_file=~/.ssh/id_rsa build-instance\n";

fn workspace(build_file: &str, inventory: Option<&str>) -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("build.yaml"), build_file).unwrap();
    if let Some(inventory) = inventory {
        std::fs::write(dir.path().join("inventory.ini"), inventory).unwrap();
    }
    dir
}

fn ferry(dir: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("ferry"));
    cmd.current_dir(dir.path())
        .env("DO_TOKEN", "test-token")
        .env_remove("FERRY_INVENTORY")
        .env("NO_COLOR", "1");
    cmd
}

#[test]
fn test_missing_job_exits_one_with_diagnostic() {
    let dir = workspace(BUILD_FILE, Some(INVENTORY));
    ferry(&dir)
        .args(["build", "--jobs=release", "--build=build.yaml"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "Error: Job 'release' not found in build file",
        ));
}

#[test]
fn test_unreadable_build_file_is_fatal() {
    let dir = TempDir::new().unwrap();
    ferry(&dir)
        .args(["build", "-j", "deploy", "-b", "nope.yaml"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("reading nope.yaml"));
}

#[test]
fn test_malformed_payload_for_known_tag_is_fatal() {
    let dir = workspace("jobs:\n  deploy:\n    - eslint: 5\n", Some(INVENTORY));
    ferry(&dir)
        .args(["build", "-j", "deploy", "-b", "build.yaml"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid build file"));
}

#[test]
fn test_inventory_without_build_host_is_fatal() {
    let dir = workspace(BUILD_FILE, Some("[all]\n"));
    ferry(&dir)
        .args(["build", "-j", "deploy", "-b", "build.yaml"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no build host"));
}

#[test]
fn test_missing_inventory_is_fatal() {
    let dir = workspace(BUILD_FILE, None);
    ferry(&dir)
        .args(["build", "-j", "deploy", "-b", "build.yaml"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no build host"));
}

#[test]
fn test_inventory_flag_overrides_default_path() {
    let dir = workspace(BUILD_FILE, None);
    std::fs::write(dir.path().join("hosts.ini"), "[all]\n").unwrap();
    ferry(&dir)
        .args([
            "build",
            "-j",
            "release",
            "-b",
            "build.yaml",
            "--inventory",
            "hosts.ini",
        ])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Job 'release' not found"));
}

#[test]
fn test_blue_green_job_without_proxy_binary_fails_before_provisioning() {
    let build_file = "\
jobs:
  release:
    - blue-green:
        healthcheck: /health
        steps:
          - command: docker run -d -p 5001:3000 app:blue
";
    let dir = workspace(build_file, Some(INVENTORY));
    ferry(&dir)
        .args([
            "build",
            "-j",
            "release",
            "-b",
            "build.yaml",
            "--proxy-binary",
            "dist/ferry-proxy",
        ])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Build IP address").not())
        .stderr(predicate::str::contains(
            "Proxy binary not found at dist/ferry-proxy",
        ));
}
