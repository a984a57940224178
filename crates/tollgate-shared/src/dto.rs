//! Data Transfer Objects - response types for the API.

use serde::{Deserialize, Serialize};

/// Admission counters since process start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitStatsResponse {
    /// Whether a counter store is configured.
    pub configured: bool,
    pub admitted: u64,
    pub denied: u64,
    /// Admitted because no counter store is configured.
    pub degraded_not_configured: u64,
    /// Admitted because the counter store failed.
    pub degraded_store_error: u64,
}
