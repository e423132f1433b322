//! Local filesystem helpers: build file loading and path expansion.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::domain::{BuildFile, ConfigError};

/// Read and parse a build file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a valid build file.
pub fn load_build_file(path: &Path) -> Result<BuildFile> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    BuildFile::from_yaml(&content).with_context(|| format!("parsing {}", path.display()))
}

/// Fail unless `path` is an existing regular file.
///
/// # Errors
///
/// Returns `ConfigError::MissingProxyBinary` naming the path.
pub fn require_proxy_binary(path: &Path) -> Result<(), ConfigError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(ConfigError::MissingProxyBinary(path.display().to_string()))
    }
}

/// Expand a leading `~` to the home directory. Other paths are returned as is.
#[must_use]
pub fn expand_tilde(path: &str) -> PathBuf {
    let rest = match path.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest.trim_start_matches('/'),
        _ => return PathBuf::from(path),
    };
    match dirs::home_dir() {
        Some(home) if rest.is_empty() => home,
        Some(home) => home.join(rest),
        None => PathBuf::from(path),
    }
}

/// Default playbook directory: `playbooks/` beside the build file.
#[must_use]
pub fn default_playbook_dir(build_file: &Path) -> PathBuf {
    build_file
        .parent()
        .unwrap_or_else(|| Path::new(""))
        .join("playbooks")
}
