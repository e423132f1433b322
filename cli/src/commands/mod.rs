//! Command implementations

pub mod build;
pub mod init;

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Args;

use crate::application::services::provision::{PollPolicy, Timings};
use crate::infra::fs::default_playbook_dir;

/// Where and how new instances are created.
#[derive(Args, Debug, Clone)]
pub struct ProvisionArgs {
    /// Provider region slug
    #[arg(long, default_value = "nyc1")]
    pub region: String,

    /// Instance size slug
    #[arg(long, default_value = "s-1vcpu-2gb")]
    pub size: String,

    /// Base image slug
    #[arg(long, default_value = "ubuntu-20-04-x64")]
    pub image: String,

    /// Seconds to wait for a new instance to become active (0 waits forever)
    #[arg(long, value_name = "SECS", default_value_t = 600)]
    pub active_timeout: u64,

    /// Playbook directory [default: playbooks/ beside the build file]
    #[arg(long)]
    pub playbooks: Option<PathBuf>,
}

impl ProvisionArgs {
    #[must_use]
    pub fn timings(&self) -> Timings {
        let timeout = (self.active_timeout > 0).then(|| Duration::from_secs(self.active_timeout));
        Timings {
            poll: PollPolicy {
                timeout,
                ..PollPolicy::default()
            },
            ..Timings::default()
        }
    }

    #[must_use]
    pub fn playbook_dir(&self, build_file: &Path) -> PathBuf {
        self.playbooks
            .clone()
            .unwrap_or_else(|| default_playbook_dir(build_file))
    }
}
