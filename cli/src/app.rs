//! Application context: unified state passed to every command handler.
//!
//! Constructed once in `Cli::run()` after credentials are checked, so no
//! command starts without them.

use std::path::PathBuf;

use anyhow::Result;

use crate::cli::ConnectionArgs;
use crate::domain::RemoteHost;
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::credentials;
use crate::infra::fs::expand_tilde;
use crate::infra::inventory::FileInventoryStore;
use crate::infra::playbook::AnsiblePlaybookRunner;
use crate::infra::provisioner::DigitalOceanProvisioner;
use crate::infra::ssh::SshRemoteShell;
use crate::output::{OutputContext, TerminalReporter};

/// Output rendering flags.
pub struct OutputFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
}

/// Flags passed from the top-level CLI to `AppContext::new`.
pub struct AppFlags {
    pub output: OutputFlags,
    pub connection: ConnectionArgs,
}

/// SSH identity used for every host.
pub struct Connection {
    pub user: String,
    /// Key path with `~` expanded, for the local `ssh` client.
    pub key_path: PathBuf,
    /// Key path as given, for the inventory file.
    pub key_display: String,
}

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    pub provisioner: DigitalOceanProvisioner,
    pub shell: SshRemoteShell<TokioCommandRunner>,
    pub playbooks: AnsiblePlaybookRunner<TokioCommandRunner>,
    pub inventory: FileInventoryStore,
    pub connection: Connection,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags.
    ///
    /// # Errors
    ///
    /// Returns `CredentialError::Missing` if `DO_TOKEN` is unset, or an error
    /// if the HTTP client cannot be built.
    pub fn new(flags: &AppFlags) -> Result<Self> {
        let token = credentials::api_token()?;
        let connection = &flags.connection;
        Ok(Self {
            output: OutputContext::new(flags.output.no_color, flags.output.quiet),
            provisioner: DigitalOceanProvisioner::new(token)?,
            shell: SshRemoteShell::new(TokioCommandRunner::new()),
            playbooks: AnsiblePlaybookRunner::new(TokioCommandRunner::new()),
            inventory: FileInventoryStore::new(connection.inventory.clone()),
            connection: Connection {
                user: connection.user.clone(),
                key_path: expand_tilde(&connection.ssh_key),
                key_display: connection.ssh_key.clone(),
            },
        })
    }

    /// Progress reporter writing to this context's terminal.
    #[must_use]
    pub fn terminal_reporter(&self) -> TerminalReporter<'_> {
        TerminalReporter::new(&self.output)
    }

    /// The host at `address`, reached with the configured identity.
    #[must_use]
    pub fn host(&self, address: impl Into<String>) -> RemoteHost {
        RemoteHost::new(
            address,
            self.connection.user.clone(),
            self.connection.key_path.clone(),
        )
    }
}
