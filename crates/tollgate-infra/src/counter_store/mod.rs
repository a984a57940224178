//! Counter store implementations - Redis and in-memory.

mod config;
mod memory;
mod retry;

pub use config::{CounterStoreConfig, StoreKind};
pub use memory::InMemoryCounterStore;

#[cfg(feature = "redis")]
mod redis;
#[cfg(feature = "redis")]
pub use self::redis::RedisCounterStore;

use tollgate_core::ports::{CounterBackend, CounterStoreError};

/// Build the counter backend described by `config`.
///
/// A missing endpoint yields [`CounterBackend::NotConfigured`]; only a
/// malformed endpoint is an error.
pub fn counter_backend(config: &CounterStoreConfig) -> Result<CounterBackend, CounterStoreError> {
    match config.kind {
        StoreKind::Memory => {
            tracing::info!("Using in-memory counter store (per-process counts)");
            Ok(CounterBackend::configured(InMemoryCounterStore::new()))
        }
        StoreKind::Redis => match config.url.as_deref() {
            Some(url) => redis_backend(url, config),
            None => {
                tracing::warn!("REDIS_URL not set. Rate limiting is disabled (fail-open).");
                Ok(CounterBackend::NotConfigured)
            }
        },
    }
}

#[cfg(feature = "redis")]
fn redis_backend(
    url: &str,
    config: &CounterStoreConfig,
) -> Result<CounterBackend, CounterStoreError> {
    let store = RedisCounterStore::new(url, config)?;
    Ok(CounterBackend::configured(store))
}

#[cfg(not(feature = "redis"))]
fn redis_backend(
    _url: &str,
    _config: &CounterStoreConfig,
) -> Result<CounterBackend, CounterStoreError> {
    tracing::warn!("Built without redis feature. Rate limiting is disabled (fail-open).");
    Ok(CounterBackend::NotConfigured)
}
