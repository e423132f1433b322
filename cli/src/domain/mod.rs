//! Domain layer: pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod build_file;
pub mod deploy;
pub mod error;
pub mod host;
pub mod inventory;
pub mod task;

pub use build_file::{BuildFile, Job};
pub use deploy::{Stage, StageError};
pub use error::{ConfigError, CredentialError, ProvisioningError, TransportError};
pub use host::RemoteHost;
pub use inventory::{INVENTORY_HEADER, Inventory, InventoryRecord};
pub use task::{BlueGreenTask, DeployStep, LintCheck, Task};
