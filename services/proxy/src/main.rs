//! ferry-proxy entry point.
//!
//! Initialises tracing, loads configuration from `FERRY_PROXY_*` environment
//! variables, starts the health checker and serves the forwarding router.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use ferry_common::{PROXY_ENV_PREFIX, ProxyConfig};
use ferry_proxy::{HealthChecker, HttpProbe, ProxyState, Upstreams};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config: ProxyConfig = envy::prefixed(PROXY_ENV_PREFIX)
        .from_env()
        .context("failed to load config from FERRY_PROXY_* env vars")?;

    tracing::info!(
        listen_addr = %config.listen_addr,
        blue = %config.blue_url,
        green = %config.green_url,
        interval_ms = config.check_interval_ms,
        "ferry-proxy starting",
    );

    let interval = Duration::from_millis(config.check_interval_ms.max(1));
    let state = Arc::new(ProxyState::new(Upstreams::from(&config))?);
    let probe = HttpProbe::new(interval).context("building health probe client")?;
    // Runs until the process is terminated.
    let _checker = HealthChecker::new(state.clone(), probe, interval).start();

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "listening");

    axum::serve(listener, ferry_proxy::router(state))
        .await
        .context("proxy server error")
}
