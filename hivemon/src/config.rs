//! Daemon configuration.

use std::env;

/// Runtime configuration for the daemon.
///
/// Poll cadence and per-device timeouts are fixed constants in their
/// owning modules; only deployment-specific knobs live here.
#[derive(Debug, Clone)]
pub struct Config {
    /// Socket address the API server binds to.
    pub listen_addr: String,

    /// Path of the JSON device store.
    pub store_path: String,

    /// Base URL of the mempool.space-compatible network data service.
    pub network_api_base: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:7787".to_string(),
            store_path: "hivemon-devices.json".to_string(),
            network_api_base: "https://mempool.space".to_string(),
        }
    }
}

impl Config {
    /// Build a config from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            listen_addr: env::var("HIVEMON_LISTEN").unwrap_or(defaults.listen_addr),
            store_path: env::var("HIVEMON_STORE").unwrap_or(defaults.store_path),
            network_api_base: env::var("HIVEMON_NETWORK_API")
                .unwrap_or(defaults.network_api_base),
        }
    }
}
