//! Sequential job and setup execution against one remote host.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::application::ports::{BlueGreenDeployer, PlaybookRunner, ProgressReporter, RemoteShell};
use crate::domain::task::{apt_install_command, git_clone_command, lint_command};
use crate::domain::{BuildFile, RemoteHost, Task};

/// Where playbooks live and how long to pause between setup commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerSettings {
    /// Directory playbook names are resolved against.
    pub playbook_dir: PathBuf,
    /// Pause before each `command` task of a setup list.
    pub setup_command_pause: Duration,
}

impl RunnerSettings {
    /// Roles directory handed to the playbook runner.
    #[must_use]
    pub fn roles_dir(&self) -> PathBuf {
        self.playbook_dir.join("roles")
    }
}

/// Counts for a finished job or setup list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobReport {
    /// Tasks dispatched to a port.
    pub dispatched: usize,
    /// Tags of tasks that were skipped.
    pub skipped: Vec<String>,
}

/// Outcome of [`TaskRunner::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Completed(JobReport),
    /// The job is not in the build file; nothing ran.
    NotFound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Job,
    Setup,
}

/// Runs tasks one at a time, awaiting each before starting the next.
///
/// The first failing task aborts the rest; nothing is retried or undone.
pub struct TaskRunner<'a, S, P, B, R> {
    shell: &'a S,
    playbooks: &'a P,
    blue_green: &'a B,
    reporter: &'a R,
    settings: RunnerSettings,
}

impl<'a, S, P, B, R> TaskRunner<'a, S, P, B, R>
where
    S: RemoteShell,
    P: PlaybookRunner,
    B: BlueGreenDeployer,
    R: ProgressReporter,
{
    pub fn new(
        shell: &'a S,
        playbooks: &'a P,
        blue_green: &'a B,
        reporter: &'a R,
        settings: RunnerSettings,
    ) -> Self {
        Self {
            shell,
            playbooks,
            blue_green,
            reporter,
            settings,
        }
    }

    /// Run the job called `name` from `build_file` against `host`.
    ///
    /// A missing job is reported and returns [`JobOutcome::NotFound`].
    ///
    /// # Errors
    ///
    /// Returns the first task failure.
    pub async fn run(
        &self,
        build_file: &BuildFile,
        name: &str,
        host: &RemoteHost,
    ) -> Result<JobOutcome> {
        let Some(job) = build_file.job(name) else {
            self.reporter
                .warn(&format!("Job '{name}' not found in build file"));
            return Ok(JobOutcome::NotFound);
        };
        tracing::info!(job = job.name, tasks = job.tasks.len(), host = %host, "running job");
        let report = self
            .run_tasks(job.tasks, host, Scope::Job)
            .await
            .with_context(|| format!("job '{name}' failed"))?;
        Ok(JobOutcome::Completed(report))
    }

    /// Run a `setup` list against a freshly provisioned host.
    ///
    /// Only `command`, `apt`, `git` and `playbook` tasks are valid here.
    ///
    /// # Errors
    ///
    /// Returns the first task failure.
    pub async fn run_setup(&self, tasks: &[Task], host: &RemoteHost) -> Result<JobReport> {
        let report = self
            .run_tasks(tasks, host, Scope::Setup)
            .await
            .context("setup failed")?;
        self.reporter.success("All commands have finished running");
        Ok(report)
    }

    async fn run_tasks(&self, tasks: &[Task], host: &RemoteHost, scope: Scope) -> Result<JobReport> {
        let mut report = JobReport::default();
        for task in tasks {
            if self.dispatch(task, host, scope).await? {
                report.dispatched += 1;
            } else {
                report.skipped.push(task.tag().to_string());
            }
        }
        Ok(report)
    }

    /// Returns `false` when the task was skipped.
    async fn dispatch(&self, task: &Task, host: &RemoteHost, scope: Scope) -> Result<bool> {
        match task {
            Task::RunCommand(command) => {
                if scope == Scope::Setup && !self.settings.setup_command_pause.is_zero() {
                    tokio::time::sleep(self.settings.setup_command_pause).await;
                }
                self.reporter.step(&format!("Running command: {command}"));
                self.exec(host, command).await?;
                self.reporter
                    .success(&format!("Command '{command}' has finished running"));
            }
            Task::AptInstall(package) => {
                self.reporter.step(&format!("Installing package: {package}"));
                self.exec(host, &apt_install_command(package)).await?;
                self.reporter.success(&format!(
                    "Apt command for package '{package}' has finished running"
                ));
            }
            Task::GitClone(repo) => {
                self.reporter.step(&format!("Cloning repository: {repo}"));
                self.exec(host, &git_clone_command(repo)).await?;
                self.reporter.success(&format!(
                    "Git clone for repository '{repo}' has finished running"
                ));
            }
            Task::RunPlaybook(playbook) => {
                self.reporter.step(&format!("Running playbook: {playbook}"));
                self.playbooks
                    .run_playbook(
                        host,
                        &self.settings.playbook_dir.join(playbook),
                        &self.settings.roles_dir(),
                    )
                    .await?;
                self.reporter.success(&format!(
                    "Ansible playbook '{playbook}' has finished running"
                ));
            }
            Task::LintCheck(_) | Task::BlueGreenDeploy(_) if scope == Scope::Setup => {
                return Ok(self.skip(task, "setup task"));
            }
            Task::LintCheck(check) => {
                self.reporter
                    .step(&format!("Running ESLint on directory: {}", check.dir));
                self.exec(host, &lint_command(check)).await?;
                self.reporter.success(&format!(
                    "ESLint for directory '{}' has finished running",
                    check.dir
                ));
            }
            Task::BlueGreenDeploy(deploy) => self.blue_green.deploy(deploy).await?,
            Task::Unknown(_) => return Ok(self.skip(task, "task")),
        }
        Ok(true)
    }

    async fn exec(&self, host: &RemoteHost, command: &str) -> Result<()> {
        tracing::debug!(host = %host, command, "remote exec");
        let stdout = self.shell.exec(host, command).await?;
        if !stdout.is_empty() {
            tracing::debug!(host = %host, %stdout, "remote output");
        }
        Ok(())
    }

    fn skip(&self, task: &Task, kind: &str) -> bool {
        tracing::warn!(tag = task.tag(), "unknown {kind}");
        self.reporter
            .warn(&format!("Unknown {kind} '{}', skipping", task.tag()));
        false
    }
}
