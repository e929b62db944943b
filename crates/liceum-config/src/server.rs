use std::env;

use crate::{env_flag, env_parse};

/// Every Nth "list all events" call runs the stale-event cleanup.
pub const DEFAULT_CLEANUP_EVERY: u64 = 20;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cleanup_every: u64,
    pub metrics_enabled: bool,
    pub log_dir: String,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env_parse("PORT", 8000),
            cleanup_every: env_parse("CLEANUP_EVERY", DEFAULT_CLEANUP_EVERY).max(1),
            metrics_enabled: env_flag("METRICS_ENABLED", true),
            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "storage/logs".to_string()),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
