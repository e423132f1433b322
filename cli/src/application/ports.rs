//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`, never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::path::Path;
use std::process::Output;

use anyhow::Result;

use crate::domain::{BlueGreenTask, Inventory, RemoteHost};

// ── Value Types ───────────────────────────────────────────────────────────────

/// Parameters for creating a new instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstanceSpec<'a> {
    /// Instance name, e.g. `"deployment-instance"`.
    pub name: &'a str,
    /// Region slug, e.g. `"nyc1"`.
    pub region: &'a str,
    /// Size slug, e.g. `"s-1vcpu-2gb"`.
    pub size: &'a str,
    /// Image slug, e.g. `"ubuntu-20-04-x64"`.
    pub image: &'a str,
}

/// Instance status as reported by the provisioner. Only `active` matters;
/// every other status means "keep waiting".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstanceStatus {
    Active,
    Other(String),
}

impl InstanceStatus {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw {
            "active" => Self::Active,
            other => Self::Other(other.to_string()),
        }
    }
}

// ── Provisioner Port ──────────────────────────────────────────────────────────

/// Instance lifecycle calls against the cloud provider.
#[allow(async_fn_in_trait)]
pub trait Provisioner {
    /// Create an instance and return its id. Does not wait for it to boot.
    async fn create(&self, spec: &InstanceSpec<'_>) -> Result<u64>;
    /// Current status of the instance.
    async fn status(&self, id: u64) -> Result<InstanceStatus>;
    /// Public IPv4 address of the instance.
    async fn address(&self, id: u64) -> Result<String>;
}

// ── Remote Execution Ports ────────────────────────────────────────────────────

/// Command execution and file copy on a remote host.
#[allow(async_fn_in_trait)]
pub trait RemoteShell {
    /// Run `command` on `host` and return its captured stdout.
    ///
    /// Non-zero exit is an error. No timeout is applied.
    async fn exec(&self, host: &RemoteHost, command: &str) -> Result<String>;
    /// Copy a local file to `remote` (relative to the login home).
    async fn copy(&self, host: &RemoteHost, local: &Path, remote: &str) -> Result<()>;
}

/// Third-party configuration-management runner.
#[allow(async_fn_in_trait)]
pub trait PlaybookRunner {
    /// Apply `playbook` to `host`, resolving roles from `roles_dir`.
    async fn run_playbook(&self, host: &RemoteHost, playbook: &Path, roles_dir: &Path)
    -> Result<()>;
}

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program and capture its output.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
    /// Run a program with extra environment variables and capture its output.
    async fn run_with_env(
        &self,
        program: &str,
        args: &[&str],
        envs: &[(&str, &str)],
    ) -> Result<Output>;
}

// ── Blue-Green Port ───────────────────────────────────────────────────────────

/// Runs a whole blue-green deployment for one task.
#[allow(async_fn_in_trait)]
pub trait BlueGreenDeployer {
    async fn deploy(&self, task: &BlueGreenTask) -> Result<()>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Synchronous.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}

// ── Inventory Port ────────────────────────────────────────────────────────────

/// Persists the role → host mapping.
pub trait InventoryStore {
    /// Load the inventory. A missing file is an empty inventory.
    fn load(&self) -> Result<Inventory>;
    /// Replace the stored inventory.
    fn save(&self, inventory: &Inventory) -> Result<()>;
}
