//! Redis counter store using a fixed-window INCR with expiry.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{Client, RedisResult, Script};
use tokio::sync::OnceCell;

use tollgate_core::ports::{CounterStore, CounterStoreError};

use super::CounterStoreConfig;
use super::retry::with_retries;

// INCR and EXPIRE run as one script so a key can never be left without a TTL.
// The TTL check also repairs keys created by anything other than this script.
const INCREMENT_SCRIPT: &str = r#"
local current = redis.call('INCR', KEYS[1])
if current == 1 or redis.call('TTL', KEYS[1]) == -1 then
    redis.call('EXPIRE', KEYS[1], ARGV[1])
end
return current
"#;

/// Redis-backed counter store.
///
/// The connection is opened on the first increment, not at construction, and
/// then shared by every caller through a cloned `ConnectionManager`. A failed
/// connect leaves nothing cached, so the next call tries again. Dropping the
/// store closes the connection.
pub struct RedisCounterStore {
    client: Client,
    conn: OnceCell<ConnectionManager>,
    script: Script,
    connect_timeout: Duration,
    op_timeout: Duration,
    attempts: u32,
    retry_delay: Duration,
}

impl RedisCounterStore {
    /// Parse `url` and prepare the store. Performs no network I/O.
    pub fn new(url: &str, config: &CounterStoreConfig) -> Result<Self, CounterStoreError> {
        let client =
            Client::open(url).map_err(|e| CounterStoreError::InvalidEndpoint(e.to_string()))?;

        Ok(Self {
            client,
            conn: OnceCell::new(),
            script: Script::new(INCREMENT_SCRIPT),
            connect_timeout: config.connect_timeout,
            op_timeout: config.op_timeout,
            attempts: config.attempts(),
            retry_delay: config.retry_delay,
        })
    }

    /// Whether the shared connection has been established.
    pub fn is_connected(&self) -> bool {
        self.conn.initialized()
    }

    /// Shared connection, opening it if needed.
    ///
    /// The bound covers waiting behind another caller's connect as well as
    /// the connect itself, so a stalled server cannot queue callers up.
    async fn connection(&self) -> Result<ConnectionManager, String> {
        let init = self.conn.get_or_try_init(|| async {
            let conn = ConnectionManager::new(self.client.clone())
                .await
                .map_err(|e| e.to_string())?;

            tracing::info!(
                addr = %self.client.get_connection_info().addr,
                "Connected to Redis counter store"
            );
            Ok::<_, String>(conn)
        });

        let conn = tokio::time::timeout(self.connect_timeout, init)
            .await
            .map_err(|_| "Connection timed out".to_string())??;

        Ok(conn.clone())
    }

    async fn try_increment(&self, key: &str, ttl_secs: u64) -> Result<u64, String> {
        let mut conn = self.connection().await?;

        let mut invocation = self.script.key(key);
        invocation.arg(ttl_secs);

        let count: RedisResult<i64> =
            tokio::time::timeout(self.op_timeout, invocation.invoke_async(&mut conn))
                .await
                .map_err(|_| "Operation timed out".to_string())?;

        let count = count.map_err(|e| e.to_string())?;
        u64::try_from(count).map_err(|_| format!("Unexpected counter value {}", count))
    }
}

#[async_trait]
impl CounterStore for RedisCounterStore {
    async fn increment(&self, key: &str, ttl: Duration) -> Result<u64, CounterStoreError> {
        // Redis expiry has whole-second granularity.
        let ttl_secs = ttl.as_secs().max(1);

        // A timed-out attempt may still have been applied, so a retry can count
        // one request twice.
        with_retries(self.attempts, self.retry_delay, key, |_| {
            self.try_increment(key, ttl_secs)
        })
        .await
    }
}
