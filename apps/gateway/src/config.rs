//! Application configuration loaded from environment variables.

use std::env;

use tollgate_core::{PolicyError, RateLimitPolicy};
use tollgate_infra::CounterStoreConfig;

/// Window applied to every `/api/` route when unset.
const DEFAULT_WINDOW_SECS: i64 = 10;
const DEFAULT_MAX_REQUESTS: i64 = 20;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub policy: RateLimitPolicy,
    pub store: CounterStoreConfig,
}

/// Configuration errors that prevent startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be an integer, got {value:?}")]
    NotAnInteger { name: &'static str, value: String },

    #[error(transparent)]
    Policy(#[from] PolicyError),
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let policy = RateLimitPolicy::new(
            env_i64("RATE_LIMIT_WINDOW_SECS", DEFAULT_WINDOW_SECS)?,
            env_i64("RATE_LIMIT_MAX_REQUESTS", DEFAULT_MAX_REQUESTS)?,
        )?;

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            policy,
            store: CounterStoreConfig::from_env(),
        })
    }
}

/// Read an integer variable; unset means `default`, garbage is an error.
fn env_i64(name: &'static str, default: i64) -> Result<i64, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::NotAnInteger { name, value }),
        Err(_) => Ok(default),
    }
}
