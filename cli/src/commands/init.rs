//! `ferry init`: provision a build host and run the build file's setup tasks.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::services::build_init::{InitSettings, NoDeployments, init_build_host};
use crate::application::services::task_runner::{RunnerSettings, TaskRunner};
use crate::commands::ProvisionArgs;
use crate::infra::fs::load_build_file;

/// Arguments for the init command.
#[derive(Args)]
pub struct InitArgs {
    /// Build file (YAML) whose `setup` list is run
    #[arg(short = 'b', long = "build", value_name = "PATH")]
    pub build: PathBuf,

    #[command(flatten)]
    pub provision: ProvisionArgs,
}

/// Run `ferry init`.
///
/// # Errors
///
/// Returns an error if the build file is invalid, provisioning fails, the
/// inventory cannot be written, or a setup task fails.
pub async fn run(args: &InitArgs, app: &AppContext) -> Result<()> {
    let build_file = load_build_file(&args.build)?;
    let reporter = app.terminal_reporter();
    let timings = args.provision.timings();

    let runner = TaskRunner::new(
        &app.shell,
        &app.playbooks,
        &NoDeployments,
        &reporter,
        RunnerSettings {
            playbook_dir: args.provision.playbook_dir(&args.build),
            setup_command_pause: timings.setup_command_pause,
        },
    );
    let settings = InitSettings {
        region: args.provision.region.clone(),
        size: args.provision.size.clone(),
        image: args.provision.image.clone(),
        user: app.connection.user.clone(),
        key_path: app.connection.key_path.clone(),
        inventory_key_path: app.connection.key_display.clone(),
        timings,
    };

    let outcome = init_build_host(
        &app.provisioner,
        &app.inventory,
        &runner,
        &reporter,
        &build_file.setup,
        &settings,
    )
    .await?;

    app.output.kv("Build host", &outcome.instance.address);
    app.output
        .kv("Inventory", &app.inventory.path().display().to_string());
    if !outcome.setup.skipped.is_empty() {
        app.output.kv("Skipped", &outcome.setup.skipped.join(", "));
    }
    Ok(())
}
