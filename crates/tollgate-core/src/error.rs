//! Domain-level error types.

use thiserror::Error;

/// Invalid rate limit policy supplied by a caller.
///
/// This is a programming error at the call site and is never converted into
/// a fail-open decision.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("Invalid policy: window_seconds must be positive, got {0}")]
    InvalidWindow(i64),

    #[error("Invalid policy: max_requests must be positive, got {0}")]
    InvalidMaxRequests(i64),
}
