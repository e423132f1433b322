//! Task model: one tagged variant per build-file entry.
//!
//! Tasks are decoded once when the build file is loaded. An entry whose tag is
//! not recognised decodes to [`Task::Unknown`] instead of failing the load, so
//! the runner can report and skip it.

use indexmap::IndexMap;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigError;

// ── Tags ─────────────────────────────────────────────────────────────────────

pub const TAG_COMMAND: &str = "command";
pub const TAG_APT: &str = "apt";
pub const TAG_GIT: &str = "git";
pub const TAG_PLAYBOOK: &str = "playbook";
pub const TAG_ESLINT: &str = "eslint";
pub const TAG_BLUE_GREEN: &str = "blue-green";

// ── Types ────────────────────────────────────────────────────────────────────

/// A single build-file task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    /// Run a literal shell command on the host.
    RunCommand(String),
    /// Install an apt package.
    AptInstall(String),
    /// Clone a git repository.
    GitClone(String),
    /// Run a playbook by file name.
    RunPlaybook(String),
    /// Run eslint over a directory with explicit rules.
    LintCheck(LintCheck),
    /// Provision a deployment instance and cut over with the proxy.
    BlueGreenDeploy(BlueGreenTask),
    /// An entry whose tag is not recognised.
    Unknown(String),
}

/// Payload of an `eslint` task.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LintCheck {
    /// Directory on the host to lint.
    pub dir: String,
    /// Rule name to severity, in declaration order.
    #[serde(default, deserialize_with = "severity_map")]
    pub rules: IndexMap<String, String>,
}

/// Payload of a `blue-green` task.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BlueGreenTask {
    /// Path appended to the instance address in the verification hint.
    pub healthcheck: String,
    /// Commands that start the two service variants, run in order.
    #[serde(default, alias = "tasks")]
    pub steps: Vec<DeployStep>,
}

/// One blue-green sub-task.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DeployStep {
    pub command: String,
}

impl Task {
    /// Build-file tag of this task (the unrecognised tag for `Unknown`).
    #[must_use]
    pub fn tag(&self) -> &str {
        match self {
            Task::RunCommand(_) => TAG_COMMAND,
            Task::AptInstall(_) => TAG_APT,
            Task::GitClone(_) => TAG_GIT,
            Task::RunPlaybook(_) => TAG_PLAYBOOK,
            Task::LintCheck(_) => TAG_ESLINT,
            Task::BlueGreenDeploy(_) => TAG_BLUE_GREEN,
            Task::Unknown(tag) => tag,
        }
    }

    /// Decode a task from its tag and payload.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidTask` if the tag is recognised but the
    /// payload has the wrong shape.
    pub fn from_tagged(tag: &str, payload: serde_yaml::Value) -> Result<Self, ConfigError> {
        let invalid = |e: serde_yaml::Error| ConfigError::InvalidTask {
            tag: tag.to_string(),
            reason: e.to_string(),
        };
        Ok(match tag {
            TAG_COMMAND => Task::RunCommand(serde_yaml::from_value(payload).map_err(invalid)?),
            TAG_APT => Task::AptInstall(serde_yaml::from_value(payload).map_err(invalid)?),
            TAG_GIT => Task::GitClone(serde_yaml::from_value(payload).map_err(invalid)?),
            TAG_PLAYBOOK => Task::RunPlaybook(serde_yaml::from_value(payload).map_err(invalid)?),
            TAG_ESLINT => Task::LintCheck(serde_yaml::from_value(payload).map_err(invalid)?),
            TAG_BLUE_GREEN => {
                Task::BlueGreenDeploy(serde_yaml::from_value(payload).map_err(invalid)?)
            }
            other => Task::Unknown(other.to_string()),
        })
    }
}

impl<'de> Deserialize<'de> for Task {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entry = IndexMap::<String, serde_yaml::Value>::deserialize(deserializer)?;
        if entry.len() != 1 {
            return Err(de::Error::custom(ConfigError::AmbiguousTask(entry.len())));
        }
        let Some((tag, payload)) = entry.into_iter().next() else {
            return Err(de::Error::custom(ConfigError::AmbiguousTask(0)));
        };
        Task::from_tagged(&tag, payload).map_err(de::Error::custom)
    }
}

/// eslint accepts severities as words (`"warn"`) or levels (`1`).
fn severity_map<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<IndexMap<String, String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Severity {
        Word(String),
        Level(i64),
    }

    let raw = IndexMap::<String, Severity>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(rule, severity)| {
            let severity = match severity {
                Severity::Word(word) => word,
                Severity::Level(level) => level.to_string(),
            };
            (rule, severity)
        })
        .collect())
}

// ── Command rendering ────────────────────────────────────────────────────────

/// `apt-get -y install <package>`
#[must_use]
pub fn apt_install_command(package: &str) -> String {
    format!("apt-get -y install {package}")
}

/// `git clone <repo>`
#[must_use]
pub fn git_clone_command(repo: &str) -> String {
    format!("git clone {repo}")
}

/// Render rules as eslint flags, one `--rule "name:severity"` per entry.
#[must_use]
pub fn lint_rule_flags(rules: &IndexMap<String, String>) -> String {
    rules
        .iter()
        .map(|(rule, severity)| format!("--rule \"{rule}:{severity}\""))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Install eslint globally, then lint `check.dir` with only the given rules.
#[must_use]
pub fn lint_command(check: &LintCheck) -> String {
    let mut eslint = format!(
        "eslint {} --no-eslintrc --no-inline-config --env es6,node --parser-options=sourceType:module",
        check.dir
    );
    let flags = lint_rule_flags(&check.rules);
    if !flags.is_empty() {
        eslint.push(' ');
        eslint.push_str(&flags);
    }
    format!("npm install -g eslint && {eslint}")
}

// ── Unit tests ────────────────────────────────────────────────────────────────
