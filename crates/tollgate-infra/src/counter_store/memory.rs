//! In-memory counter store - single-process deployments and tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Mutex;

use tollgate_core::ports::{CounterStore, CounterStoreError};

/// Expired keys are swept roughly once per this many increments.
const EVICTION_INTERVAL: u64 = 256;

struct CounterEntry {
    count: u64,
    expires_at: Instant,
}

/// In-memory counter store using a HashMap behind an async Mutex.
///
/// Increments are serialized by the lock, so concurrent callers never lose
/// updates. Counts are per-process and lost on restart.
pub struct InMemoryCounterStore {
    counters: Mutex<HashMap<String, CounterEntry>>,
    ops: AtomicU64,
}

impl InMemoryCounterStore {
    pub fn new() -> Self {
        Self {
            counters: Mutex::new(HashMap::new()),
            ops: AtomicU64::new(0),
        }
    }

    /// Number of live (unexpired) keys.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        let counters = self.counters.lock().await;
        counters.values().filter(|e| e.expires_at > now).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for InMemoryCounterStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CounterStore for InMemoryCounterStore {
    async fn increment(&self, key: &str, ttl: Duration) -> Result<u64, CounterStoreError> {
        let now = Instant::now();
        let mut counters = self.counters.lock().await;

        if self.ops.fetch_add(1, Ordering::Relaxed) % EVICTION_INTERVAL == 0 {
            counters.retain(|_, entry| entry.expires_at > now);
        }

        let entry = counters
            .entry(key.to_string())
            .or_insert_with(|| CounterEntry {
                count: 0,
                expires_at: now + ttl,
            });

        // An expired key starts over as if it had been removed.
        if entry.expires_at <= now {
            entry.count = 0;
            entry.expires_at = now + ttl;
        }

        entry.count += 1;
        Ok(entry.count)
    }
}
