//! `RemoteShell` over the system `ssh` and `scp` clients.
//!
//! Hosts are freshly provisioned and their keys unknown, so host key
//! checking is disabled and nothing is written to `known_hosts`.

use std::path::Path;

use anyhow::Result;

use crate::application::ports::{CommandRunner, RemoteShell};
use crate::domain::{RemoteHost, TransportError};

/// Human-readable exit status for transport errors.
pub(crate) fn status_text(output: &std::process::Output) -> String {
    output
        .status
        .code()
        .map_or_else(|| "terminated by signal".to_string(), |c| format!("exit code {c}"))
}

/// Options shared by `ssh` and `scp`.
fn connection_args(host: &RemoteHost) -> Vec<String> {
    vec![
        "-o".to_string(),
        "StrictHostKeyChecking=no".to_string(),
        "-o".to_string(),
        "UserKnownHostsFile=/dev/null".to_string(),
        "-o".to_string(),
        "IdentitiesOnly=yes".to_string(),
        "-o".to_string(),
        "LogLevel=ERROR".to_string(),
        "-i".to_string(),
        host.key_path.display().to_string(),
    ]
}

/// Runs remote commands through a `CommandRunner` so tests can inject a fake.
pub struct SshRemoteShell<R> {
    runner: R,
}

impl<R: CommandRunner> SshRemoteShell<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }
}

impl<R: CommandRunner> RemoteShell for SshRemoteShell<R> {
    async fn exec(&self, host: &RemoteHost, command: &str) -> Result<String> {
        let mut args = connection_args(host);
        args.push(host.destination());
        args.push(command.to_string());
        let args: Vec<&str> = args.iter().map(String::as_str).collect();

        let output = self.runner.run("ssh", &args).await?;
        if !output.status.success() {
            return Err(TransportError::CommandFailed {
                host: host.address.clone(),
                command: command.to_string(),
                status: status_text(&output),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
            .into());
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn copy(&self, host: &RemoteHost, local: &Path, remote: &str) -> Result<()> {
        let mut args = connection_args(host);
        args.push(local.display().to_string());
        args.push(format!("{}:{remote}", host.destination()));
        let args: Vec<&str> = args.iter().map(String::as_str).collect();

        let output = self.runner.run("scp", &args).await?;
        if !output.status.success() {
            return Err(TransportError::CopyFailed {
                host: host.address.clone(),
                local: local.display().to_string(),
                remote: remote.to_string(),
                status: status_text(&output),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
            .into());
        }
        Ok(())
    }
}
