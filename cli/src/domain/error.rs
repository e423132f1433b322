//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use thiserror::Error;

// ── Configuration errors ──────────────────────────────────────────────────────

/// Errors resolving jobs, tasks or the inventory from loaded configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Job '{0}' not found in build file")]
    JobNotFound(String),

    #[error("Invalid build file: {0}")]
    InvalidBuildFile(String),

    #[error("Invalid '{tag}' task: {reason}")]
    InvalidTask { tag: String, reason: String },

    #[error("A task must carry exactly one tag, found {0}")]
    AmbiguousTask(usize),

    #[error("Inventory has no build host on line 2. Run 'ferry init' to create one.")]
    MissingBuildHost,

    #[error("Proxy binary not found at {0}. Build ferry-proxy or pass --proxy-binary.")]
    MissingProxyBinary(String),
}

// ── Transport errors ──────────────────────────────────────────────────────────

/// Remote command, file copy or playbook failures. Always fatal to the job.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Command failed on {host} ({status}): {command}\n{stderr}")]
    CommandFailed {
        host: String,
        command: String,
        status: String,
        stderr: String,
    },

    #[error("Copy of {local} to {host}:{remote} failed ({status})\n{stderr}")]
    CopyFailed {
        host: String,
        local: String,
        remote: String,
        status: String,
        stderr: String,
    },

    #[error("Playbook {playbook} failed against {host} ({status})\n{stderr}")]
    PlaybookFailed {
        host: String,
        playbook: String,
        status: String,
        stderr: String,
    },
}

// ── Provisioning errors ───────────────────────────────────────────────────────

/// Instance creation and activation failures. Nothing is cleaned up.
#[derive(Debug, Error)]
pub enum ProvisioningError {
    #[error("Provisioner API returned {status} for {operation}: {body}")]
    Api {
        operation: String,
        status: u16,
        body: String,
    },

    #[error("Instance {id} has no IPv4 address")]
    NoAddress { id: u64 },

    #[error("Instance {id} did not become active within {waited_secs}s")]
    ActivationTimeout { id: u64, waited_secs: u64 },
}

// ── Credential errors ─────────────────────────────────────────────────────────

/// Missing credentials, detected before any command runs.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("You must set a {0} environment variable to run this app.")]
    Missing(&'static str),
}
