//! Infrastructure layer: concrete implementations of application port traits.
//!
//! This module contains all I/O-performing code: process execution, SSH,
//! the provider API, and inventory and build file access.
//!
//! Imports from `crate::domain` and `crate::application::ports` are allowed.
//! Imports from `crate::commands` or `crate::output` are forbidden.

pub mod command_runner;
pub mod credentials;
pub mod fs;
pub mod inventory;
pub mod playbook;
pub mod provisioner;
pub mod ssh;

#[cfg(test)]
pub(crate) mod test_support;
