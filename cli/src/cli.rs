//! CLI argument parsing with clap derive

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use crate::app::{AppContext, AppFlags, OutputFlags};
use crate::commands;

/// Provision a build host, run build jobs over SSH and cut over blue-green deployments
#[derive(Parser)]
#[command(
    name = "ferry",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(
        long,
        global = true,
        env = "NO_COLOR",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    pub no_color: bool,

    /// Show diagnostic logs (commands, remote output, poll status)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// How to reach hosts and where they are recorded.
#[derive(Args, Debug, Clone)]
pub struct ConnectionArgs {
    /// Inventory file mapping roles to hosts
    #[arg(long, global = true, env = "FERRY_INVENTORY", default_value = "inventory.ini")]
    pub inventory: PathBuf,

    /// SSH login user
    #[arg(long, global = true, default_value = "root")]
    pub user: String,

    /// SSH private key
    #[arg(long, global = true, default_value = "~/.ssh/id_rsa")]
    pub ssh_key: String,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run a job from the build file against the build host
    Build(commands::build::BuildArgs),

    /// Provision a build host and run the build file's setup tasks
    Init(commands::init::InitArgs),
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if credentials are missing or the command fails.
    pub async fn run(self) -> Result<()> {
        let Cli {
            connection,
            quiet,
            no_color,
            verbose: _,
            command,
        } = self;
        let app = AppContext::new(&AppFlags {
            output: OutputFlags { no_color, quiet },
            connection,
        })?;
        match command {
            Command::Build(args) => commands::build::run(&args, &app).await,
            Command::Init(args) => commands::init::run(&args, &app).await,
        }
    }
}
