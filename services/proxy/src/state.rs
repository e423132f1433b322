//! Shared proxy state: the fixed upstream pair and the current target.
//!
//! The health-check loop is the only writer of the target; every request
//! handler reads it. The target lives in an atomic so a read never observes a
//! half-written value and no lock is held across a forward.

use std::sync::atomic::{AtomicU8, Ordering};

use ferry_common::{ProxyConfig, Slot};

/// Fixed Blue/Green upstream base URLs, assigned once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upstreams {
    blue: String,
    green: String,
}

impl Upstreams {
    #[must_use]
    pub fn new(blue: impl Into<String>, green: impl Into<String>) -> Self {
        Self {
            blue: blue.into(),
            green: green.into(),
        }
    }

    /// Base URL of `slot`, without a trailing slash.
    #[must_use]
    pub fn url(&self, slot: Slot) -> &str {
        match slot {
            Slot::Blue => self.blue.trim_end_matches('/'),
            Slot::Green => self.green.trim_end_matches('/'),
        }
    }
}

impl From<&ProxyConfig> for Upstreams {
    fn from(config: &ProxyConfig) -> Self {
        Self::new(config.blue_url.clone(), config.green_url.clone())
    }
}

/// Atomic holder for the slot traffic is forwarded to.
#[derive(Debug)]
pub struct TargetCell(AtomicU8);

impl TargetCell {
    #[must_use]
    pub fn new(initial: Slot) -> Self {
        Self(AtomicU8::new(encode(initial)))
    }

    /// Slot traffic should be forwarded to right now.
    #[must_use]
    pub fn current(&self) -> Slot {
        decode(self.0.load(Ordering::Acquire))
    }

    /// Replace the target, returning the previous one.
    ///
    /// Only the health-check cycle calls this.
    pub(crate) fn set(&self, slot: Slot) -> Slot {
        decode(self.0.swap(encode(slot), Ordering::AcqRel))
    }
}

const fn encode(slot: Slot) -> u8 {
    match slot {
        Slot::Blue => 0,
        Slot::Green => 1,
    }
}

// Only `encode` ever writes the cell, so anything but 1 is Blue.
const fn decode(raw: u8) -> Slot {
    if raw == 1 { Slot::Green } else { Slot::Blue }
}

/// State shared between the health checker and the request handlers.
#[derive(Debug)]
pub struct ProxyState {
    pub upstreams: Upstreams,
    pub target: TargetCell,
    pub(crate) client: reqwest::Client,
}

impl ProxyState {
    /// New state targeting Blue, with a forwarding client that passes
    /// redirects through to the caller instead of following them.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(upstreams: Upstreams) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self {
            upstreams,
            target: TargetCell::new(Slot::Blue),
            client,
        })
    }
}
