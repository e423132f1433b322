use std::fmt;

/// Inventory role label for the build instance created by `ferry init`.
pub const BUILD_ROLE: &str = "build-instance";

/// Inventory role label for the blue-green deployment instance.
pub const DEPLOYMENT_ROLE: &str = "deployment-instance";

/// One of the two deployment slots fronted by the proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Blue,
    Green,
}

impl Slot {
    /// Both slots, in bootstrap order.
    pub const ALL: [Slot; 2] = [Slot::Blue, Slot::Green];

    /// Lower-case name, also used as the slot's working directory on the host.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Slot::Blue => "blue",
            Slot::Green => "green",
        }
    }

    /// Local port the slot's service variant is expected to listen on.
    #[must_use]
    pub fn default_port(self) -> u16 {
        match self {
            Slot::Blue => 5001,
            Slot::Green => 5002,
        }
    }

    /// Default upstream URL for the slot (`http://localhost:<port>`).
    #[must_use]
    pub fn default_url(self) -> String {
        format!("http://localhost:{}", self.default_port())
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
