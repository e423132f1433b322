//! `PlaybookRunner` backed by `ansible-playbook`.

use std::path::Path;

use anyhow::Result;

use crate::application::ports::{CommandRunner, PlaybookRunner};
use crate::domain::{RemoteHost, TransportError};
use crate::infra::ssh::status_text;

pub struct AnsiblePlaybookRunner<R> {
    runner: R,
}

impl<R: CommandRunner> AnsiblePlaybookRunner<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }
}

impl<R: CommandRunner> PlaybookRunner for AnsiblePlaybookRunner<R> {
    async fn run_playbook(
        &self,
        host: &RemoteHost,
        playbook: &Path,
        roles_dir: &Path,
    ) -> Result<()> {
        let playbook_arg = playbook.display().to_string();
        // Trailing comma makes ansible treat the address as an inline inventory.
        let inventory_arg = format!("{},", host.address);
        let key_arg = host.key_path.display().to_string();
        let roles_arg = roles_dir.display().to_string();

        let output = self
            .runner
            .run_with_env(
                "ansible-playbook",
                &[
                    &playbook_arg,
                    "-i",
                    &inventory_arg,
                    "-u",
                    &host.user,
                    "--private-key",
                    &key_arg,
                ],
                &[
                    ("ANSIBLE_ROLES_PATH", &roles_arg),
                    ("ANSIBLE_HOST_KEY_CHECKING", "False"),
                ],
            )
            .await?;

        if !output.status.success() {
            return Err(TransportError::PlaybookFailed {
                host: host.address.clone(),
                playbook: playbook_arg,
                status: status_text(&output),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
            .into());
        }
        tracing::debug!(
            playbook = %playbook_arg,
            stdout = %String::from_utf8_lossy(&output.stdout),
            "playbook output"
        );
        Ok(())
    }
}
