//! Remote host identity used by every remote operation.

use std::fmt;
use std::path::PathBuf;

/// A host reachable over SSH.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteHost {
    pub address: String,
    pub user: String,
    /// Private key on the local machine, already tilde-expanded.
    pub key_path: PathBuf,
}

impl RemoteHost {
    #[must_use]
    pub fn new(address: impl Into<String>, user: impl Into<String>, key_path: PathBuf) -> Self {
        Self {
            address: address.into(),
            user: user.into(),
            key_path,
        }
    }

    /// `user@address`
    #[must_use]
    pub fn destination(&self) -> String {
        format!("{}@{}", self.user, self.address)
    }
}

impl fmt::Display for RemoteHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.address)
    }
}
