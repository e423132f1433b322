//! Inventory file model (`inventory.ini`).
//!
//! Line 1 is a group header. Every following line is
//! `<address> ansible_user=<user> ansible_ssh_private_key_file=<path> [<role>]`.
//! Line 2 is the build host. A role label appears on at most one line.

use std::fmt;

use crate::domain::error::ConfigError;

/// Default header written to new inventories.
pub const INVENTORY_HEADER: &str = "[all]";

const USER_KEY: &str = "ansible_user";
const KEY_FILE_KEY: &str = "ansible_ssh_private_key_file";

/// One host line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryRecord {
    pub address: String,
    pub user: String,
    pub key_path: String,
    pub role: Option<String>,
}

impl InventoryRecord {
    #[must_use]
    pub fn new(
        address: impl Into<String>,
        user: impl Into<String>,
        key_path: impl Into<String>,
        role: Option<&str>,
    ) -> Self {
        Self {
            address: address.into(),
            user: user.into(),
            key_path: key_path.into(),
            role: role.map(str::to_string),
        }
    }

    /// Parse a host line. Returns `None` for lines that are not host records
    /// (group headers, comments, hosts without user and key).
    #[must_use]
    pub fn parse_line(line: &str) -> Option<Self> {
        let mut tokens = line.split_whitespace();
        let address = tokens.next()?;
        if address.starts_with('[') || address.starts_with('#') || address.starts_with(';') {
            return None;
        }
        let mut user = None;
        let mut key_path = None;
        let mut role = None;
        for token in tokens {
            match token.split_once('=') {
                Some((USER_KEY, v)) => user = Some(v),
                Some((KEY_FILE_KEY, v)) => key_path = Some(v),
                Some(_) => {}
                None => role = Some(token),
            }
        }
        Some(Self::new(address, user?, key_path?, role))
    }
}

impl fmt::Display for InventoryRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {USER_KEY}={} {KEY_FILE_KEY}={}",
            self.address, self.user, self.key_path
        )?;
        if let Some(role) = &self.role {
            write!(f, " {role}")?;
        }
        Ok(())
    }
}

/// Parsed inventory. Lines that are not host records are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inventory {
    header: String,
    lines: Vec<String>,
}

impl Default for Inventory {
    fn default() -> Self {
        Self {
            header: INVENTORY_HEADER.to_string(),
            lines: Vec::new(),
        }
    }
}

impl Inventory {
    /// A fresh inventory holding exactly `record`.
    #[must_use]
    pub fn with_record(record: &InventoryRecord) -> Self {
        Self {
            lines: vec![record.to_string()],
            ..Self::default()
        }
    }

    /// Parse inventory text. Blank lines are dropped; an empty file yields an
    /// empty inventory with the default header.
    #[must_use]
    pub fn parse(content: &str) -> Self {
        let mut lines = content.lines();
        let header = lines
            .next()
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .unwrap_or(INVENTORY_HEADER)
            .to_string();
        Self {
            header,
            lines: lines
                .map(str::trim_end)
                .filter(|l| !l.trim().is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    /// Render back to file text, newline-terminated.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = self.header.clone();
        out.push('\n');
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        out
    }

    /// Address on the first data line (line 2 of the file).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingBuildHost` if there is no data line.
    pub fn build_address(&self) -> Result<&str, ConfigError> {
        self.lines
            .first()
            .and_then(|line| line.split_whitespace().next())
            .ok_or(ConfigError::MissingBuildHost)
    }

    /// All parseable host records, in file order.
    pub fn records(&self) -> impl Iterator<Item = InventoryRecord> + '_ {
        self.lines.iter().filter_map(|l| InventoryRecord::parse_line(l))
    }

    /// The record carrying `role`, if any.
    #[must_use]
    pub fn record_for_role(&self, role: &str) -> Option<InventoryRecord> {
        self.records().find(|r| r.role.as_deref() == Some(role))
    }

    /// Replace whatever line carries `record`'s role with `record`, appending
    /// it at the end. Records without a role are simply appended.
    pub fn upsert_role(&mut self, record: &InventoryRecord) {
        if let Some(role) = record.role.as_deref() {
            self.lines
                .retain(|line| !line.split_whitespace().skip(1).any(|token| token == role));
        }
        self.lines.push(record.to_string());
    }
}
