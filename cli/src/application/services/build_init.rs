//! `ferry init`: provision a build host, record it and run `setup`.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use ferry_common::BUILD_ROLE;

use crate::application::ports::{
    BlueGreenDeployer, InstanceSpec, InventoryStore, PlaybookRunner, ProgressReporter,
    Provisioner, RemoteShell,
};
use crate::application::services::provision::{
    ProvisionedInstance, Timings, provision_instance, settle,
};
use crate::application::services::task_runner::{JobReport, TaskRunner};
use crate::domain::{BlueGreenTask, Inventory, InventoryRecord, RemoteHost, Task};

/// Stands in for the deployer while running `setup`, where blue-green
/// tasks are skipped before dispatch.
pub struct NoDeployments;

impl BlueGreenDeployer for NoDeployments {
    async fn deploy(&self, _task: &BlueGreenTask) -> Result<()> {
        anyhow::bail!("blue-green deployments cannot run during setup")
    }
}

#[derive(Debug, Clone)]
pub struct InitSettings {
    pub region: String,
    pub size: String,
    pub image: String,
    pub user: String,
    pub key_path: PathBuf,
    pub inventory_key_path: String,
    pub timings: Timings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitOutcome {
    pub instance: ProvisionedInstance,
    pub setup: JobReport,
}

/// Provision a fresh build host, overwrite the inventory with it, wait for it
/// to settle, then run `setup` against it.
///
/// # Errors
///
/// Returns the first provisioning, inventory or setup failure. A host that
/// was already created is left running.
pub async fn init_build_host<S, P, B, R>(
    provisioner: &impl Provisioner,
    inventory: &impl InventoryStore,
    runner: &TaskRunner<'_, S, P, B, R>,
    reporter: &R,
    setup: &[Task],
    settings: &InitSettings,
) -> Result<InitOutcome>
where
    S: RemoteShell,
    P: PlaybookRunner,
    B: BlueGreenDeployer,
    R: ProgressReporter,
{
    let spec = InstanceSpec {
        name: BUILD_ROLE,
        region: &settings.region,
        size: &settings.size,
        image: &settings.image,
    };
    let instance = provision_instance(provisioner, &spec, &settings.timings.poll, reporter).await?;

    let fresh = Inventory::with_record(&InventoryRecord::new(
        instance.address.as_str(),
        settings.user.as_str(),
        settings.inventory_key_path.as_str(),
        Some(BUILD_ROLE),
    ));
    inventory.save(&fresh).context("writing inventory")?;
    reporter.success(&format!("Build IP address: {}", instance.address));

    settle(reporter, settings.timings.settle, "running commands").await;

    let host = RemoteHost::new(
        instance.address.clone(),
        settings.user.clone(),
        settings.key_path.clone(),
    );
    let setup = runner.run_setup(setup, &host).await?;
    Ok(InitOutcome { instance, setup })
}
