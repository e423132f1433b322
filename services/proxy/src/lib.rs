//! ferry blue-green proxy.
//!
//! Forwards every HTTP request to one of two fixed upstreams (Blue, Green),
//! choosing whichever the background health checker last found healthy.

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod forward;
pub mod health;
pub mod state;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;

pub use health::{CycleOutcome, HealthCheckHandle, HealthChecker, HttpProbe, Probe, run_cycle};
pub use state::{ProxyState, TargetCell, Upstreams};

/// Router that forwards every path and method to the current target.
pub fn router(state: Arc<ProxyState>) -> Router {
    Router::new()
        .fallback(forward::forward)
        .layer(DefaultBodyLimit::max(forward::MAX_BODY_BYTES))
        .with_state(state)
}
