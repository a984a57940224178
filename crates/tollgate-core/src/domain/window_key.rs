use std::fmt;

use super::RateLimitPolicy;

/// Prefix shared by every counter key. Changing it orphans live counters.
pub const KEY_PREFIX: &str = "rl";

/// Store key for one identity in one fixed window: `rl:<identity>:<epoch>`.
///
/// Built fresh for every request and never cached.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WindowKey {
    key: String,
    epoch: u64,
}

impl WindowKey {
    pub fn new(identity: &str, policy: &RateLimitPolicy, now: u64) -> Self {
        let epoch = policy.epoch(now);
        Self {
            key: format!("{}:{}:{}", KEY_PREFIX, identity, epoch),
            epoch,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.key
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

impl fmt::Display for WindowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}
