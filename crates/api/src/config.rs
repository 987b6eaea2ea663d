//! Configuration loaded from environment variables.

use std::env;
use std::net::SocketAddr;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Identity provider credentials.
#[derive(Debug, Clone)]
pub struct ClerkConfig {
    pub secret_key: String,
    pub api_url: String,
}

/// Default Clerk backend API.
pub const DEFAULT_CLERK_API_URL: &str = "https://api.clerk.com";

/// API server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address.
    pub addr: SocketAddr,
    /// SQLite database URL.
    pub database_url: String,
    /// Comma-separated allowed origins; any origin when unset.
    pub cors_origins: Option<String>,
    /// Identity provider; organisations and users get local ids without it.
    pub clerk: Option<ClerkConfig>,
    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `API_ADDR` | Server bind address | `127.0.0.1:3000` |
    /// | `DATABASE_URL` | SQLite database URL | `sqlite:autofollow.db?mode=rwc` |
    /// | `CORS_ORIGINS` | Allowed origins, comma separated | any |
    /// | `CLERK_SECRET_KEY` | Identity provider secret | (local ids) |
    /// | `CLERK_API_URL` | Identity provider API | `https://api.clerk.com` |
    /// | `LOG_FORMAT` | `text` or `json` | `text` |
    ///
    /// The relay (`REDIS_URL`), brain (`ANTHROPIC_*`) and engine
    /// (`FOLLOWUP_*`) settings are read by their own crates.
    pub fn from_env() -> Result<Self, ConfigError> {
        let addr = env::var("API_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidAddr)?;

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite:autofollow.db?mode=rwc".to_string());

        let cors_origins = non_empty("CORS_ORIGINS");

        let clerk = non_empty("CLERK_SECRET_KEY").map(|secret_key| ClerkConfig {
            secret_key,
            api_url: non_empty("CLERK_API_URL")
                .unwrap_or_else(|| DEFAULT_CLERK_API_URL.to_string()),
        });

        let log_format = match env::var("LOG_FORMAT").ok().as_deref().map(str::trim) {
            None | Some("") | Some("text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => return Err(ConfigError::InvalidLogFormat(other.to_string())),
        };

        Ok(Self {
            addr,
            database_url,
            cors_origins,
            clerk,
            log_format,
        })
    }
}

fn non_empty(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid API_ADDR format")]
    InvalidAddr,

    #[error("LOG_FORMAT must be 'text' or 'json', got '{0}'")]
    InvalidLogFormat(String),
}
