//! `ferry build`: run one job from the build file against the build host.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use ferry_common::ProxyConfig;

use crate::app::AppContext;
use crate::application::ports::{InventoryStore, ProgressReporter};
use crate::application::services::blue_green::{BlueGreenOrchestrator, BlueGreenSettings};
use crate::application::services::task_runner::{JobOutcome, RunnerSettings, TaskRunner};
use crate::commands::ProvisionArgs;
use crate::domain::ConfigError;
use crate::domain::deploy::PROXY_BINARY;
use crate::infra::fs::{load_build_file, require_proxy_binary};

/// Arguments for the build command.
#[derive(Args)]
pub struct BuildArgs {
    /// Job to run
    #[arg(short = 'j', long = "jobs", value_name = "NAME")]
    pub jobs: String,

    /// Build file (YAML)
    #[arg(short = 'b', long = "build", value_name = "PATH")]
    pub build: PathBuf,

    /// Proxy binary installed by blue-green tasks [default: ferry-proxy beside this executable]
    #[arg(long, env = "FERRY_PROXY_BINARY")]
    pub proxy_binary: Option<PathBuf>,

    #[command(flatten)]
    pub provision: ProvisionArgs,
}

/// Run `ferry build`.
///
/// # Errors
///
/// Returns an error if the build file or inventory is invalid, the job is
/// missing, a blue-green job has no proxy binary to install, or any task
/// fails.
pub async fn run(args: &BuildArgs, app: &AppContext) -> Result<()> {
    let build_file = load_build_file(&args.build)?;
    let job = build_file.require_job(&args.jobs)?;
    // Checked up front: by the install stage an instance already exists.
    let proxy_binary = resolve_proxy_binary(args.proxy_binary.as_ref())?;
    if job.deploys_blue_green() {
        require_proxy_binary(&proxy_binary)?;
    }

    let inventory = app.inventory.load()?;
    let address = inventory.build_address()?.to_string();
    let reporter = app.terminal_reporter();
    reporter.step(&format!("Build IP address: {address}"));
    let host = app.host(address);

    let timings = args.provision.timings();
    let orchestrator = BlueGreenOrchestrator::new(
        &app.provisioner,
        &app.shell,
        &app.inventory,
        &reporter,
        BlueGreenSettings {
            region: args.provision.region.clone(),
            size: args.provision.size.clone(),
            image: args.provision.image.clone(),
            user: app.connection.user.clone(),
            key_path: app.connection.key_path.clone(),
            inventory_key_path: app.connection.key_display.clone(),
            proxy_binary,
            proxy: ProxyConfig::default(),
            timings,
        },
    );
    let runner = TaskRunner::new(
        &app.shell,
        &app.playbooks,
        &orchestrator,
        &reporter,
        RunnerSettings {
            playbook_dir: args.provision.playbook_dir(&args.build),
            setup_command_pause: timings.setup_command_pause,
        },
    );

    match runner.run(&build_file, &args.jobs, &host).await? {
        JobOutcome::Completed(report) => {
            tracing::info!(
                dispatched = report.dispatched,
                skipped = report.skipped.len(),
                "job finished"
            );
            reporter.success("All jobs have finished running");
            Ok(())
        }
        JobOutcome::NotFound => Err(ConfigError::JobNotFound(args.jobs.clone()).into()),
    }
}

fn resolve_proxy_binary(explicit: Option<&PathBuf>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.clone());
    }
    let exe = std::env::current_exe().context("locating the ferry executable")?;
    Ok(exe.with_file_name(PROXY_BINARY))
}
