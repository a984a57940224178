//! Counter store port.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

/// Atomic increment-with-expiry over a shared key/value service.
///
/// Implementations must be safe for concurrent use: increments from many
/// tasks or processes against the same key must never be lost.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Increment `key` and return the post-increment count.
    ///
    /// The first increment of a key returns 1 and schedules its removal after
    /// `ttl`. Later increments before expiry return the running count.
    async fn increment(&self, key: &str, ttl: Duration) -> Result<u64, CounterStoreError>;
}

/// Counter store errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CounterStoreError {
    /// The store cannot serve requests because it has no backing service.
    #[error("Counter store unavailable")]
    Unavailable,

    /// Network, timeout or protocol failure after bounded retries.
    #[error("Counter store failed after {attempts} attempt(s): {reason}")]
    Transient { attempts: u32, reason: String },

    /// Malformed connection endpoint.
    #[error("Invalid counter store endpoint: {0}")]
    InvalidEndpoint(String),
}

/// The counter store capability handed to the admission controller.
///
/// An absent store is a normal state, not an error.
#[derive(Clone, Default)]
pub enum CounterBackend {
    Configured(Arc<dyn CounterStore>),
    #[default]
    NotConfigured,
}

impl CounterBackend {
    pub fn configured(store: impl CounterStore + 'static) -> Self {
        Self::Configured(Arc::new(store))
    }

    pub fn is_configured(&self) -> bool {
        matches!(self, Self::Configured(_))
    }
}

impl std::fmt::Debug for CounterBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Configured(_) => f.write_str("CounterBackend::Configured"),
            Self::NotConfigured => f.write_str("CounterBackend::NotConfigured"),
        }
    }
}
