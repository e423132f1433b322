//! Shared recording fakes for application service tests.
//!
//! Every fake writes into a shared `Journal` so tests can assert the global
//! order of remote effects across ports.

use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::Result;

use crate::application::ports::{
    BlueGreenDeployer, InstanceSpec, InstanceStatus, InventoryStore, PlaybookRunner,
    ProgressReporter, Provisioner, RemoteShell,
};
use crate::domain::{BlueGreenTask, Inventory, RemoteHost};

/// Ordered log of effects, shared between fakes.
#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn push(&self, entry: String) {
        self.0.lock().expect("lock").push(entry);
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().expect("lock").clone()
    }
}

// ── Reporter ──────────────────────────────────────────────────────────────────

/// Captures every reported message, warnings prefixed with `warn: `.
#[derive(Default)]
pub struct RecordingReporter {
    messages: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().expect("lock").clone()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.messages()
            .into_iter()
            .filter_map(|m| m.strip_prefix("warn: ").map(str::to_string))
            .collect()
    }
}

impl ProgressReporter for RecordingReporter {
    fn step(&self, message: &str) {
        self.messages.lock().expect("lock").push(message.to_string());
    }
    fn success(&self, message: &str) {
        self.messages.lock().expect("lock").push(message.to_string());
    }
    fn warn(&self, message: &str) {
        self.messages
            .lock()
            .expect("lock")
            .push(format!("warn: {message}"));
    }
}

// ── Remote shell ──────────────────────────────────────────────────────────────

/// Records `exec:<addr>:<command>` and `copy:<addr>:<local>-><remote>`.
///
/// Fails any exec whose command contains `fail_on`. Panics if two remote
/// operations overlap.
#[derive(Default)]
pub struct RecordingShell {
    pub journal: Journal,
    fail_on: Option<String>,
    busy: AtomicBool,
}

impl RecordingShell {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            ..Self::default()
        }
    }

    pub fn failing_on(journal: Journal, needle: &str) -> Self {
        Self {
            journal,
            fail_on: Some(needle.to_string()),
            ..Self::default()
        }
    }

    async fn enter(&self) {
        assert!(
            !self.busy.swap(true, Ordering::SeqCst),
            "remote operations overlapped"
        );
        tokio::task::yield_now().await;
    }

    fn leave(&self) {
        self.busy.store(false, Ordering::SeqCst);
    }
}

impl RemoteShell for RecordingShell {
    async fn exec(&self, host: &RemoteHost, command: &str) -> Result<String> {
        self.enter().await;
        self.journal.push(format!("exec:{}:{command}", host.address));
        self.leave();
        if let Some(needle) = &self.fail_on
            && command.contains(needle.as_str())
        {
            anyhow::bail!("ssh: connection refused");
        }
        Ok(String::new())
    }

    async fn copy(&self, host: &RemoteHost, local: &Path, remote: &str) -> Result<()> {
        self.enter().await;
        self.journal
            .push(format!("copy:{}:{}->{remote}", host.address, local.display()));
        self.leave();
        Ok(())
    }
}

// ── Playbooks ─────────────────────────────────────────────────────────────────

/// Records `playbook:<addr>:<playbook>:<roles>`.
pub struct RecordingPlaybooks {
    pub journal: Journal,
}

impl PlaybookRunner for RecordingPlaybooks {
    async fn run_playbook(
        &self,
        host: &RemoteHost,
        playbook: &Path,
        roles_dir: &Path,
    ) -> Result<()> {
        self.journal.push(format!(
            "playbook:{}:{}:{}",
            host.address,
            playbook.display(),
            roles_dir.display()
        ));
        Ok(())
    }
}

// ── Blue-green deployer ───────────────────────────────────────────────────────

/// Records `blue-green:<healthcheck>`.
pub struct RecordingDeployer {
    pub journal: Journal,
}

impl BlueGreenDeployer for RecordingDeployer {
    async fn deploy(&self, task: &BlueGreenTask) -> Result<()> {
        self.journal.push(format!("blue-green:{}", task.healthcheck));
        Ok(())
    }
}

// ── Provisioner ───────────────────────────────────────────────────────────────

/// Returns scripted statuses in order, repeating the last one.
/// An empty script makes every status call fail.
pub struct FakeProvisioner {
    statuses: Vec<String>,
    status_calls: AtomicUsize,
    created: Mutex<Vec<String>>,
    pub journal: Journal,
    fail_create: bool,
}

impl FakeProvisioner {
    pub const ID: u64 = 4242;
    pub const ADDRESS: &'static str = "203.0.113.10";

    pub fn with_statuses(statuses: &[&str]) -> Self {
        Self {
            statuses: statuses.iter().map(|s| (*s).to_string()).collect(),
            status_calls: AtomicUsize::new(0),
            created: Mutex::new(Vec::new()),
            journal: Journal::default(),
            fail_create: false,
        }
    }

    pub fn active(journal: Journal) -> Self {
        Self {
            journal,
            ..Self::with_statuses(&["active"])
        }
    }

    pub fn failing_create(journal: Journal) -> Self {
        Self {
            fail_create: true,
            ..Self::active(journal)
        }
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub fn created_names(&self) -> Vec<String> {
        self.created.lock().expect("lock").clone()
    }
}

impl Provisioner for FakeProvisioner {
    async fn create(&self, spec: &InstanceSpec<'_>) -> Result<u64> {
        self.journal.push(format!("create:{}", spec.name));
        if self.fail_create {
            anyhow::bail!("401 Unauthorized");
        }
        self.created.lock().expect("lock").push(spec.name.to_string());
        Ok(Self::ID)
    }

    async fn status(&self, _id: u64) -> Result<InstanceStatus> {
        let call = self.status_calls.fetch_add(1, Ordering::SeqCst);
        let Some(last) = self.statuses.last() else {
            anyhow::bail!("503 Service Unavailable");
        };
        let raw = self.statuses.get(call).unwrap_or(last);
        Ok(InstanceStatus::parse(raw))
    }

    async fn address(&self, _id: u64) -> Result<String> {
        Ok(Self::ADDRESS.to_string())
    }
}

// ── Inventory ─────────────────────────────────────────────────────────────────

/// In-memory inventory store.
#[derive(Default)]
pub struct MemoryInventory {
    inventory: Mutex<Inventory>,
    pub journal: Journal,
}

impl MemoryInventory {
    pub fn new(initial: Inventory, journal: Journal) -> Self {
        Self {
            inventory: Mutex::new(initial),
            journal,
        }
    }

    pub fn current(&self) -> Inventory {
        self.inventory.lock().expect("lock").clone()
    }
}

impl InventoryStore for MemoryInventory {
    fn load(&self) -> Result<Inventory> {
        Ok(self.current())
    }

    fn save(&self, inventory: &Inventory) -> Result<()> {
        self.journal.push("inventory:save".to_string());
        *self.inventory.lock().expect("lock") = inventory.clone();
        Ok(())
    }
}
