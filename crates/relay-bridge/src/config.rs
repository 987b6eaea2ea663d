//! Configuration for the relay bus.

use std::env;

/// Default Redis URL.
pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";

/// Configuration for connecting to the relay bus.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Redis connection URL.
    pub redis_url: String,
}

impl RelayConfig {
    pub fn new(redis_url: impl Into<String>) -> Self {
        Self {
            redis_url: redis_url.into(),
        }
    }

    /// Read `REDIS_URL`, falling back to the local default.
    pub fn from_env() -> Self {
        Self::new(env::var("REDIS_URL").unwrap_or_else(|_| DEFAULT_REDIS_URL.to_string()))
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self::new(DEFAULT_REDIS_URL)
    }
}
