//! Running jobs from parsed build files through the public library API.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::path::PathBuf;
use std::time::Duration;

use ferry_cli::application::services::task_runner::{
    JobOutcome, JobReport, RunnerSettings, TaskRunner,
};
use ferry_cli::domain::{BuildFile, RemoteHost};

use crate::fakes::{Calls, FakeDeployer, FakePlaybooks, FakeShell, QuietReporter};

const BUILD_FILE: &str = r#"
setup:
  - apt: nodejs
jobs:
  lint:
    - git: https://example.com/app.git
    - eslint:
        dir: app
        rules:
          no-eval: error
          no-console: warn
  release:
    - command: docker build -t app .
    - playbook: deploy.yml
    - blue-green:
        healthcheck: /health
        steps:
          - command: docker run -d -p 5001:3000 app
          - command: docker run -d -p 5002:3000 app
    - command: echo done
"#;

fn host() -> RemoteHost {
    RemoteHost::new("192.0.2.10", "root", PathBuf::from("/keys/id_rsa"))
}

fn settings() -> RunnerSettings {
    RunnerSettings {
        playbook_dir: PathBuf::from("playbooks"),
        setup_command_pause: Duration::ZERO,
    }
}

#[tokio::test]
async fn test_release_job_runs_in_declared_order() {
    let build_file = BuildFile::from_yaml(BUILD_FILE).unwrap();
    let calls = Calls::default();
    let shell = FakeShell {
        calls: &calls,
        fail: None,
    };
    let playbooks = FakePlaybooks { calls: &calls };
    let deployer = FakeDeployer { calls: &calls };
    let reporter = QuietReporter::default();
    let runner = TaskRunner::new(&shell, &playbooks, &deployer, &reporter, settings());

    let outcome = runner.run(&build_file, "release", &host()).await.unwrap();

    assert_eq!(
        outcome,
        JobOutcome::Completed(JobReport {
            dispatched: 4,
            skipped: vec![],
        })
    );
    assert_eq!(
        calls.all(),
        vec![
            "192.0.2.10$ docker build -t app .".to_string(),
            format!(
                "192.0.2.10 playbook {}",
                PathBuf::from("playbooks").join("deploy.yml").display()
            ),
            "blue-green /health (2 steps)".to_string(),
            "192.0.2.10$ echo done".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_lint_job_renders_rules_in_order() {
    let build_file = BuildFile::from_yaml(BUILD_FILE).unwrap();
    let calls = Calls::default();
    let shell = FakeShell {
        calls: &calls,
        fail: None,
    };
    let playbooks = FakePlaybooks { calls: &calls };
    let deployer = FakeDeployer { calls: &calls };
    let reporter = QuietReporter::default();
    let runner = TaskRunner::new(&shell, &playbooks, &deployer, &reporter, settings());

    runner.run(&build_file, "lint", &host()).await.unwrap();

    let all = calls.all();
    assert_eq!(all[0], "192.0.2.10$ git clone https://example.com/app.git");
    assert!(all[1].ends_with(r#"--rule "no-eval:error" --rule "no-console:warn""#));
}

#[tokio::test]
async fn test_absent_job_is_a_no_op() {
    let build_file = BuildFile::from_yaml(BUILD_FILE).unwrap();
    let calls = Calls::default();
    let shell = FakeShell {
        calls: &calls,
        fail: None,
    };
    let playbooks = FakePlaybooks { calls: &calls };
    let deployer = FakeDeployer { calls: &calls };
    let reporter = QuietReporter::default();
    let runner = TaskRunner::new(&shell, &playbooks, &deployer, &reporter, settings());

    let outcome = runner.run(&build_file, "nightly", &host()).await.unwrap();

    assert_eq!(outcome, JobOutcome::NotFound);
    assert!(calls.all().is_empty());
}

#[tokio::test]
async fn test_failure_stops_job_before_blue_green() {
    let build_file = BuildFile::from_yaml(BUILD_FILE).unwrap();
    let calls = Calls::default();
    let shell = FakeShell {
        calls: &calls,
        fail: Some("docker build -t app ."),
    };
    let playbooks = FakePlaybooks { calls: &calls };
    let deployer = FakeDeployer { calls: &calls };
    let reporter = QuietReporter::default();
    let runner = TaskRunner::new(&shell, &playbooks, &deployer, &reporter, settings());

    runner
        .run(&build_file, "release", &host())
        .await
        .expect_err("first command fails");

    assert_eq!(calls.all(), vec!["192.0.2.10$ docker build -t app .".to_string()]);
}
