//! Build file schema (`build.yaml`): named jobs plus the `setup` list.
//!
//! Pure parsing only. Reading the file is the caller's concern.

use indexmap::IndexMap;
use serde::Deserialize;

use crate::domain::error::ConfigError;
use crate::domain::task::Task;

/// Parsed build file. Job and task order match the file.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct BuildFile {
    /// Jobs by name.
    #[serde(default)]
    pub jobs: IndexMap<String, Vec<Task>>,
    /// Tasks run by `ferry init` against a fresh build instance.
    #[serde(default)]
    pub setup: Vec<Task>,
}

/// A named, read-only view of one job's tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Job<'a> {
    pub name: &'a str,
    pub tasks: &'a [Task],
}

impl Job<'_> {
    /// Whether any task provisions a blue-green deployment instance.
    #[must_use]
    pub fn deploys_blue_green(&self) -> bool {
        self.tasks
            .iter()
            .any(|task| matches!(task, Task::BlueGreenDeploy(_)))
    }
}

impl BuildFile {
    /// Parse a build file from YAML text.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidBuildFile` if the YAML is malformed or a
    /// recognised task has an invalid payload.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| ConfigError::InvalidBuildFile(e.to_string()))
    }

    /// Look up a job by name.
    #[must_use]
    pub fn job(&self, name: &str) -> Option<Job<'_>> {
        self.jobs.get_key_value(name).map(|(name, tasks)| Job {
            name: name.as_str(),
            tasks: tasks.as_slice(),
        })
    }

    /// Look up a job by name, failing if it is absent.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::JobNotFound` if no job has that name.
    pub fn require_job(&self, name: &str) -> Result<Job<'_>, ConfigError> {
        self.job(name)
            .ok_or_else(|| ConfigError::JobNotFound(name.to_string()))
    }
}
