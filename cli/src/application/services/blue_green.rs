//! Blue-green deployment onto a freshly provisioned instance.
//!
//! Stages run strictly in order. A failure is reported as a [`StageError`]
//! naming the stage; later stages do not run and nothing is torn down.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use ferry_common::{DEPLOYMENT_ROLE, ProxyConfig};

use crate::application::ports::{
    BlueGreenDeployer, InstanceSpec, InventoryStore, ProgressReporter, Provisioner, RemoteShell,
};
use crate::application::services::provision::{Timings, provision_instance, settle};
use crate::domain::deploy::{
    DOCKER_INSTALL, NODE_INSTALL, healthcheck_url, proxy_binary_path, proxy_dir_command,
    proxy_prepare_command, proxy_start_command, slot_dirs_command,
};
use crate::domain::{BlueGreenTask, InventoryRecord, RemoteHost, Stage, StageError};

/// Everything a deployment needs besides its ports.
#[derive(Debug, Clone)]
pub struct BlueGreenSettings {
    pub region: String,
    pub size: String,
    pub image: String,
    /// SSH login user.
    pub user: String,
    /// Local private key used for SSH.
    pub key_path: PathBuf,
    /// Key path as written into the inventory.
    pub inventory_key_path: String,
    /// Local proxy binary transferred to the instance.
    pub proxy_binary: PathBuf,
    /// Environment the proxy is started with.
    pub proxy: ProxyConfig,
    pub timings: Timings,
}

/// Result of a deployment that ran every stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlueGreenOutcome {
    pub instance_id: u64,
    pub address: String,
    pub completed: Vec<Stage>,
}

pub struct BlueGreenOrchestrator<'a, V, S, I, R> {
    provisioner: &'a V,
    shell: &'a S,
    inventory: &'a I,
    reporter: &'a R,
    settings: BlueGreenSettings,
}

fn at(stage: Stage) -> impl FnOnce(anyhow::Error) -> StageError {
    move |source| StageError::new(stage, source)
}

impl<'a, V, S, I, R> BlueGreenOrchestrator<'a, V, S, I, R>
where
    V: Provisioner,
    S: RemoteShell,
    I: InventoryStore,
    R: ProgressReporter,
{
    pub fn new(
        provisioner: &'a V,
        shell: &'a S,
        inventory: &'a I,
        reporter: &'a R,
        settings: BlueGreenSettings,
    ) -> Self {
        Self {
            provisioner,
            shell,
            inventory,
            reporter,
            settings,
        }
    }

    /// Run every stage for `task`.
    ///
    /// # Errors
    ///
    /// Returns a [`StageError`] for the first stage that fails.
    pub async fn execute(&self, task: &BlueGreenTask) -> Result<BlueGreenOutcome, StageError> {
        let mut completed = Vec::with_capacity(Stage::ALL.len());

        let spec = InstanceSpec {
            name: DEPLOYMENT_ROLE,
            region: &self.settings.region,
            size: &self.settings.size,
            image: &self.settings.image,
        };
        let instance = provision_instance(
            self.provisioner,
            &spec,
            &self.settings.timings.poll,
            self.reporter,
        )
        .await
        .map_err(at(Stage::Provision))?;
        completed.push(Stage::Provision);

        self.register(&instance.address).map_err(at(Stage::Register))?;
        completed.push(Stage::Register);

        settle(self.reporter, self.settings.timings.settle, "running commands").await;
        completed.push(Stage::Settle);

        let host = RemoteHost::new(
            instance.address.clone(),
            self.settings.user.clone(),
            self.settings.key_path.clone(),
        );

        self.bootstrap(&host).await.map_err(at(Stage::Bootstrap))?;
        completed.push(Stage::Bootstrap);

        self.deploy_variants(&host, task)
            .await
            .map_err(at(Stage::DeployVariants))?;
        completed.push(Stage::DeployVariants);

        self.install_proxy(&host)
            .await
            .map_err(at(Stage::InstallProxy))?;
        completed.push(Stage::InstallProxy);

        tracing::info!(id = instance.id, address = %instance.address, "blue-green deployment complete");
        Ok(BlueGreenOutcome {
            instance_id: instance.id,
            address: instance.address,
            completed,
        })
    }

    fn register(&self, address: &str) -> Result<()> {
        let mut inventory = self.inventory.load().context("loading inventory")?;
        inventory.upsert_role(&InventoryRecord::new(
            address,
            self.settings.user.as_str(),
            self.settings.inventory_key_path.as_str(),
            Some(DEPLOYMENT_ROLE),
        ));
        self.inventory.save(&inventory).context("saving inventory")?;
        self.reporter.success(&format!(
            "Registered {address} as {DEPLOYMENT_ROLE} in the inventory"
        ));
        Ok(())
    }

    async fn bootstrap(&self, host: &RemoteHost) -> Result<()> {
        self.reporter
            .step("Creating '~/blue' and '~/green' directories");
        self.shell.exec(host, &slot_dirs_command()).await?;
        self.reporter
            .success("Directories '~/blue' and '~/green' created");

        let pause = self.settings.timings.install_pause;
        settle(self.reporter, pause, "running Docker install").await;
        self.shell.exec(host, DOCKER_INSTALL).await?;
        settle(self.reporter, pause, "running Node install").await;
        self.shell.exec(host, NODE_INSTALL).await?;
        Ok(())
    }

    async fn deploy_variants(&self, host: &RemoteHost, task: &BlueGreenTask) -> Result<()> {
        let url = healthcheck_url(&host.address, &task.healthcheck);
        for step in &task.steps {
            self.reporter.step(&format!("Running command {}", step.command));
            self.shell.exec(host, &step.command).await?;
            self.reporter
                .step(&format!("Check healthcheck route by visiting {url}"));
        }
        Ok(())
    }

    async fn install_proxy(&self, host: &RemoteHost) -> Result<()> {
        self.reporter
            .step(&format!("Running proxy on {DEPLOYMENT_ROLE}"));
        self.shell.exec(host, &proxy_dir_command()).await?;
        self.shell
            .copy(host, &self.settings.proxy_binary, &proxy_binary_path())
            .await?;
        self.shell
            .exec(host, &proxy_prepare_command(&self.settings.proxy))
            .await?;
        self.shell.exec(host, &proxy_start_command()).await?;
        self.reporter
            .success(&format!("Proxy started on {}", host.address));
        Ok(())
    }
}

impl<V, S, I, R> BlueGreenDeployer for BlueGreenOrchestrator<'_, V, S, I, R>
where
    V: Provisioner,
    S: RemoteShell,
    I: InventoryStore,
    R: ProgressReporter,
{
    async fn deploy(&self, task: &BlueGreenTask) -> Result<()> {
        let outcome = self.execute(task).await?;
        tracing::debug!(completed = ?outcome.completed, "stages completed");
        Ok(())
    }
}
