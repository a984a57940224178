use std::str::FromStr;
use std::time::Duration;

/// Upper bound on retries after a failed store call.
pub const MAX_RETRIES_CAP: u32 = 2;

/// Which counter store to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreKind {
    /// Redis at `url`, or no store when `url` is unset.
    #[default]
    Redis,
    /// Per-process in-memory counts. Not shared across instances.
    Memory,
}

/// Counter store configuration.
#[derive(Debug, Clone)]
pub struct CounterStoreConfig {
    pub kind: StoreKind,
    /// Redis URL (e.g., redis://localhost:6379). `None` means not configured.
    pub url: Option<String>,
    /// Bound on establishing the connection on first use
    pub connect_timeout: Duration,
    /// Bound on each increment attempt
    pub op_timeout: Duration,
    /// Retries after the first failed attempt, at most [`MAX_RETRIES_CAP`]
    pub max_retries: u32,
    /// Base delay between attempts, multiplied by the attempt number
    pub retry_delay: Duration,
}

impl Default for CounterStoreConfig {
    fn default() -> Self {
        Self {
            kind: StoreKind::Redis,
            url: None,
            connect_timeout: Duration::from_millis(250),
            op_timeout: Duration::from_millis(150),
            max_retries: MAX_RETRIES_CAP,
            retry_delay: Duration::from_millis(10),
        }
    }
}

impl CounterStoreConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            kind: match std::env::var("RATE_LIMIT_STORE").as_deref() {
                Ok("memory") => StoreKind::Memory,
                _ => StoreKind::Redis,
            },
            url: std::env::var("REDIS_URL").ok().filter(|s| !s.trim().is_empty()),
            connect_timeout: env_millis("RATE_LIMIT_STORE_CONNECT_TIMEOUT_MS")
                .unwrap_or(defaults.connect_timeout),
            op_timeout: env_millis("RATE_LIMIT_STORE_TIMEOUT_MS").unwrap_or(defaults.op_timeout),
            max_retries: env_parse("RATE_LIMIT_STORE_MAX_RETRIES").unwrap_or(defaults.max_retries),
            retry_delay: env_millis("RATE_LIMIT_STORE_RETRY_DELAY_MS")
                .unwrap_or(defaults.retry_delay),
        }
    }

    /// Total attempts per increment, including the first.
    pub fn attempts(&self) -> u32 {
        self.max_retries.min(MAX_RETRIES_CAP) + 1
    }
}

fn env_millis(name: &str) -> Option<Duration> {
    env_parse(name).map(Duration::from_millis)
}

fn env_parse<T: FromStr>(name: &str) -> Option<T> {
    parse_value(name, std::env::var(name).ok())
}

/// Parse a variable's raw value. Unset is `None`; garbage is logged and `None`.
fn parse_value<T: FromStr>(name: &str, raw: Option<String>) -> Option<T> {
    let raw = raw?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(
                variable = name,
                value = %raw,
                "Ignoring unparseable counter store setting, using default"
            );
            None
        }
    }
}
