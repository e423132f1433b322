use serde::Deserialize;
use std::net::SocketAddr;

use crate::types::Slot;

/// Prefix of the environment variables the proxy reads its configuration from.
pub const PROXY_ENV_PREFIX: &str = "FERRY_PROXY_";

/// Blue-green proxy configuration.
///
/// Loaded once at proxy startup from `FERRY_PROXY_*` variables; the upstream
/// pair cannot change while the process runs.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ProxyConfig {
    /// Listen address (default: 0.0.0.0:80)
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,

    /// Blue upstream base URL
    #[serde(default = "default_blue_url")]
    pub blue_url: String,

    /// Green upstream base URL
    #[serde(default = "default_green_url")]
    pub green_url: String,

    /// Health-check interval in milliseconds
    #[serde(default = "default_check_interval_ms")]
    pub check_interval_ms: u64,
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 80))
}

fn default_blue_url() -> String {
    Slot::Blue.default_url()
}

fn default_green_url() -> String {
    Slot::Green.default_url()
}

fn default_check_interval_ms() -> u64 {
    1000
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            blue_url: default_blue_url(),
            green_url: default_green_url(),
            check_interval_ms: default_check_interval_ms(),
        }
    }
}

impl ProxyConfig {
    /// Upstream URL for `slot`.
    #[must_use]
    pub fn url_for(&self, slot: Slot) -> &str {
        match slot {
            Slot::Blue => &self.blue_url,
            Slot::Green => &self.green_url,
        }
    }

    /// Render the configuration as `KEY=value` lines for an env file.
    #[must_use]
    pub fn to_env_file(&self) -> String {
        format!(
            "{PROXY_ENV_PREFIX}LISTEN_ADDR={}\n\
             {PROXY_ENV_PREFIX}BLUE_URL={}\n\
             {PROXY_ENV_PREFIX}GREEN_URL={}\n\
             {PROXY_ENV_PREFIX}CHECK_INTERVAL_MS={}\n",
            self.listen_addr, self.blue_url, self.green_url, self.check_interval_ms
        )
    }
}
