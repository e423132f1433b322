//! Instance provisioning: create, wait until active, resolve the address.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! All waits go through `tokio::time` so tests can run on a paused clock.

use std::time::Duration;

use anyhow::{Context, Result};

use crate::application::ports::{InstanceSpec, InstanceStatus, ProgressReporter, Provisioner};
use crate::domain::ProvisioningError;

/// Fixed-interval activation polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Delay before each status check.
    pub interval: Duration,
    /// Give up after this long. `None` polls forever.
    pub timeout: Option<Duration>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            timeout: Some(Duration::from_secs(600)),
        }
    }
}

/// Fixed pauses around instance readiness.
///
/// These are guesses at when SSH becomes reachable after the provider
/// reports the instance active, not readiness checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    /// Pause after registering a new instance, before the first command.
    pub settle: Duration,
    /// Pause before each blue-green bootstrap install.
    pub install_pause: Duration,
    /// Pause before each `command` task during `init` setup.
    pub setup_command_pause: Duration,
    /// Activation polling.
    pub poll: PollPolicy,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            settle: Duration::from_secs(30),
            install_pause: Duration::from_secs(5),
            setup_command_pause: Duration::from_secs(5),
            poll: PollPolicy::default(),
        }
    }
}

/// A created, active instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionedInstance {
    pub id: u64,
    pub address: String,
}

/// Poll the instance status every `policy.interval` until it is active.
///
/// The first check happens one interval after the call.
///
/// # Errors
///
/// Returns an error if a status call fails, or
/// `ProvisioningError::ActivationTimeout` once `policy.timeout` has elapsed.
pub async fn wait_until_active(
    provisioner: &impl Provisioner,
    id: u64,
    policy: &PollPolicy,
) -> Result<()> {
    let started = tokio::time::Instant::now();
    loop {
        tokio::time::sleep(policy.interval).await;
        let status = provisioner
            .status(id)
            .await
            .with_context(|| format!("checking status of instance {id}"))?;
        tracing::debug!(id, ?status, "instance status");
        if status == InstanceStatus::Active {
            return Ok(());
        }
        if let Some(timeout) = policy.timeout {
            let waited = started.elapsed();
            if waited >= timeout {
                return Err(ProvisioningError::ActivationTimeout {
                    id,
                    waited_secs: waited.as_secs(),
                }
                .into());
            }
        }
    }
}

/// Create an instance, wait for it to become active and fetch its address.
///
/// A failure after creation leaves the instance running; nothing is torn down.
///
/// # Errors
///
/// Returns an error if creation, polling or the address lookup fails.
pub async fn provision_instance(
    provisioner: &impl Provisioner,
    spec: &InstanceSpec<'_>,
    policy: &PollPolicy,
    reporter: &impl ProgressReporter,
) -> Result<ProvisionedInstance> {
    let id = provisioner
        .create(spec)
        .await
        .with_context(|| format!("creating instance '{}'", spec.name))?;
    reporter.success(&format!("Instance {id} created"));

    reporter.step(&format!("Waiting for the {} to be active...", spec.name));
    wait_until_active(provisioner, id, policy).await?;

    let address = provisioner
        .address(id)
        .await
        .with_context(|| format!("resolving address of instance {id}"))?;
    reporter.success(&format!("Instance {id} is active at {address}"));
    Ok(ProvisionedInstance { id, address })
}

/// Sleep for `duration`, telling the operator why.
pub async fn settle(reporter: &impl ProgressReporter, duration: Duration, before: &str) {
    if duration.is_zero() {
        return;
    }
    reporter.step(&format!(
        "Waiting for {} seconds before {before}...",
        duration.as_secs()
    ));
    tokio::time::sleep(duration).await;
}
