//! Blue-green deployment stages and the remote commands each one issues.
//!
//! Pure data and string building; the orchestration lives in
//! `application::services::blue_green`.

use std::fmt;

use ferry_common::{ProxyConfig, Slot};
use thiserror::Error;

/// Remote directory the proxy is installed into (relative to the login home).
pub const PROXY_DIR: &str = "proxy";
/// File name of the proxy binary on the remote host.
pub const PROXY_BINARY: &str = "ferry-proxy";
/// Environment file the proxy is started with.
pub const PROXY_ENV_FILE: &str = "proxy.env";
/// Log file the detached proxy writes to.
pub const PROXY_LOG_FILE: &str = "proxy.log";

/// Installs Docker via the upstream convenience script.
pub const DOCKER_INSTALL: &str =
    "curl -fsSL https://get.docker.com -o get-docker.sh && sudo sh get-docker.sh";

/// Installs Node.js 18 from NodeSource.
pub const NODE_INSTALL: &str = "curl -fsSL https://deb.nodesource.com/setup_18.x | sudo -E bash - && sudo apt-get install -y nodejs";

/// Ordered stages of a blue-green deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Provision,
    Register,
    Settle,
    Bootstrap,
    DeployVariants,
    InstallProxy,
}

impl Stage {
    /// All stages in execution order.
    pub const ALL: [Stage; 6] = [
        Stage::Provision,
        Stage::Register,
        Stage::Settle,
        Stage::Bootstrap,
        Stage::DeployVariants,
        Stage::InstallProxy,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Provision => "provision",
            Stage::Register => "register",
            Stage::Settle => "settle",
            Stage::Bootstrap => "bootstrap",
            Stage::DeployVariants => "deploy variants",
            Stage::InstallProxy => "install proxy",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A blue-green stage failed; later stages did not run and nothing was
/// torn down.
#[derive(Debug, Error)]
#[error("blue-green deployment failed at the {stage} stage")]
pub struct StageError {
    pub stage: Stage,
    #[source]
    pub source: Box<dyn std::error::Error + Send + Sync + 'static>,
}

impl StageError {
    pub fn new(stage: Stage, source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self {
            stage,
            source: source.into(),
        }
    }
}

// ── Command builders ─────────────────────────────────────────────────────────

/// `mkdir -p ~/blue && mkdir -p ~/green`
#[must_use]
pub fn slot_dirs_command() -> String {
    Slot::ALL
        .iter()
        .map(|slot| format!("mkdir -p ~/{slot}"))
        .collect::<Vec<_>>()
        .join(" && ")
}

/// URL operators should open to check a deployed variant.
#[must_use]
pub fn healthcheck_url(address: &str, path: &str) -> String {
    if path.starts_with('/') {
        format!("http://{address}{path}")
    } else {
        format!("http://{address}/{path}")
    }
}

/// Create the proxy working directory.
#[must_use]
pub fn proxy_dir_command() -> String {
    format!("mkdir -p {PROXY_DIR}")
}

/// Remote path the proxy binary is copied to.
#[must_use]
pub fn proxy_binary_path() -> String {
    format!("{PROXY_DIR}/{PROXY_BINARY}")
}

/// Make the binary executable and write its environment file.
#[must_use]
pub fn proxy_prepare_command(config: &ProxyConfig) -> String {
    format!(
        "chmod +x {PROXY_DIR}/{PROXY_BINARY} && printf '%s' '{}' > {PROXY_DIR}/{PROXY_ENV_FILE}",
        config.to_env_file()
    )
}

/// Start the proxy detached from the SSH session.
#[must_use]
pub fn proxy_start_command() -> String {
    format!(
        "cd {PROXY_DIR} && set -a && . ./{PROXY_ENV_FILE} && set +a && \
         nohup ./{PROXY_BINARY} > {PROXY_LOG_FILE} 2>&1 < /dev/null &"
    )
}
