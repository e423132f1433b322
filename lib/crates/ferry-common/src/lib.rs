pub mod config;
pub mod types;

pub use config::{PROXY_ENV_PREFIX, ProxyConfig};
pub use types::*;
