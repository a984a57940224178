//! Domain entities - pure value types.

mod decision;
mod policy;
mod window_key;

pub use decision::{Admission, Decision, DegradedReason};
pub use policy::RateLimitPolicy;
pub use window_key::WindowKey;
