//! Configuration Management
//!
//! Provides application configuration as a singleton using `OnceLock`.
//! Configuration values are read from environment variables with
//! sensible defaults.
//!
//! ## Configuration Variables
//!
//! - `BIND_ADDRESS`: HTTP server bind address (default: `0.0.0.0:3000`)

use std::sync::OnceLock;

static CONFIG: OnceLock<Config> = OnceLock::new();

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_address: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: std::env::var("BIND_ADDRESS")
                .unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
        }
    }
}

impl Config {
    /// Initialize the global config (can only be called once)
    pub fn init() -> &'static Config {
        CONFIG.get_or_init(Config::default)
    }
}
