//! Periodic upstream health checking.
//!
//! Each cycle probes Green first and Blue second. The first healthy slot
//! becomes the target; when both probes fail the previous target is kept.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use ferry_common::Slot;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::state::ProxyState;

/// Lightweight liveness probe against an upstream base URL.
pub trait Probe {
    /// Returns `true` when the upstream answered the probe.
    fn probe(&self, url: &str) -> impl Future<Output = bool> + Send;
}

/// `GET <url>` probe. Any 2xx or 3xx final response counts as healthy.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: reqwest::Client,
}

impl HttpProbe {
    /// Build a probe whose requests give up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

impl Probe for HttpProbe {
    async fn probe(&self, url: &str) -> bool {
        match self.client.get(url).send().await {
            Ok(resp) => {
                let status = resp.status();
                status.is_success() || status.is_redirection()
            }
            Err(e) => {
                tracing::debug!(url, error = %e, "probe failed");
                false
            }
        }
    }
}

/// What a single health-check cycle decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// A healthy slot was found and is now the target.
    Selected(Slot),
    /// Both probes failed; the previous target was kept.
    Retained(Slot),
}

impl CycleOutcome {
    /// Target in effect after the cycle.
    #[must_use]
    pub fn target(self) -> Slot {
        match self {
            CycleOutcome::Selected(slot) | CycleOutcome::Retained(slot) => slot,
        }
    }
}

/// Run one health-check cycle and update the target.
pub async fn run_cycle(state: &ProxyState, probe: &impl Probe) -> CycleOutcome {
    for slot in [Slot::Green, Slot::Blue] {
        if probe.probe(state.upstreams.url(slot)).await {
            let previous = state.target.set(slot);
            if previous == slot {
                tracing::debug!(target_slot = %slot, "target unchanged");
            } else {
                tracing::info!(from = %previous, to = %slot, "switched target");
            }
            return CycleOutcome::Selected(slot);
        }
        tracing::debug!(slot = %slot, "upstream is down");
    }
    let kept = state.target.current();
    tracing::warn!(target_slot = %kept, "blue and green are both down, keeping last target");
    CycleOutcome::Retained(kept)
}

/// Fixed-interval scheduler for [`run_cycle`].
pub struct HealthChecker<P> {
    state: Arc<ProxyState>,
    probe: P,
    interval: Duration,
}

impl<P> HealthChecker<P>
where
    P: Probe + Send + Sync + 'static,
{
    #[must_use]
    pub fn new(state: Arc<ProxyState>, probe: P, interval: Duration) -> Self {
        Self {
            state,
            probe,
            interval,
        }
    }

    /// Spawn the loop on the current tokio runtime. The first cycle runs
    /// immediately, then once per interval. Dropping the returned handle
    /// stops the loop.
    #[must_use]
    pub fn start(self) -> HealthCheckHandle {
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = &mut stop_rx => break,
                    _ = ticker.tick() => {
                        run_cycle(&self.state, &self.probe).await;
                    }
                }
            }
        });
        HealthCheckHandle { stop_tx, task }
    }
}

/// Handle to a running [`HealthChecker`].
pub struct HealthCheckHandle {
    stop_tx: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl HealthCheckHandle {
    /// Stop the loop and wait for the in-flight cycle to finish.
    pub async fn stop(self) {
        let _ = self.stop_tx.send(());
        let _ = self.task.await;
    }

    /// Whether the loop has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
