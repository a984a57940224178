//! # Tollgate Core
//!
//! Fixed-window admission control.
//! This crate holds the policy and key arithmetic, the decision types, and the
//! ports a counter store must implement. It performs no I/O of its own.

pub mod admission;
pub mod domain;
pub mod error;
pub mod ports;

pub use admission::{AdmissionController, AdmissionStats, StatsSnapshot};
pub use domain::{Admission, Decision, DegradedReason, RateLimitPolicy, WindowKey};
pub use error::PolicyError;
pub use ports::{Clock, CounterBackend, CounterStore, CounterStoreError, SystemClock};
