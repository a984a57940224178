//! Wall clock port.

/// Source of the current unix time in whole seconds.
///
/// Window keys must agree across processes, so this is wall-clock time,
/// not a monotonic instant.
pub trait Clock: Send + Sync {
    fn unix_seconds(&self) -> u64;
}

/// System clock backed by `chrono::Utc::now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn unix_seconds(&self) -> u64 {
        // Clamp pre-epoch clocks to 0.
        chrono::Utc::now().timestamp().max(0) as u64
    }
}
