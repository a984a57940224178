use serde::Serialize;

use crate::error::PolicyError;

/// Fixed-window rate limit policy.
///
/// Windows are epoch-aligned: a window of `window_seconds` covers
/// `[n * window_seconds, (n + 1) * window_seconds)` in unix seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateLimitPolicy {
    window_seconds: u64,
    max_requests: u64,
}

impl RateLimitPolicy {
    /// Validate and build a policy.
    ///
    /// Both values must be strictly positive.
    pub fn new(window_seconds: i64, max_requests: i64) -> Result<Self, PolicyError> {
        if window_seconds <= 0 {
            return Err(PolicyError::InvalidWindow(window_seconds));
        }
        if max_requests <= 0 {
            return Err(PolicyError::InvalidMaxRequests(max_requests));
        }

        Ok(Self {
            window_seconds: window_seconds as u64,
            max_requests: max_requests as u64,
        })
    }

    pub fn window_seconds(&self) -> u64 {
        self.window_seconds
    }

    pub fn max_requests(&self) -> u64 {
        self.max_requests
    }

    /// Index of the fixed window containing `now`.
    pub fn epoch(&self, now: u64) -> u64 {
        now / self.window_seconds
    }

    /// Seconds until the window containing `now` closes. Always in `1..=window_seconds`.
    pub fn reset_in(&self, now: u64) -> u64 {
        self.window_seconds - (now % self.window_seconds)
    }

    /// Quota left after `count` requests have been seen in the current window.
    pub fn remaining(&self, count: u64) -> u64 {
        self.max_requests.saturating_sub(count)
    }
}
