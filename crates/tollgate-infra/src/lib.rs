//! # Tollgate Infrastructure
//!
//! Concrete counter stores for the ports defined in `tollgate-core`.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external dependencies, in-memory store only
//! - `redis` - Redis-backed counter store shared across instances

pub mod counter_store;

pub use counter_store::{CounterStoreConfig, InMemoryCounterStore, StoreKind, counter_backend};

#[cfg(feature = "redis")]
pub use counter_store::RedisCounterStore;
