//! # Tollgate Shared
//!
//! Wire types returned to HTTP clients of the gateway.

pub mod dto;
pub mod response;

pub use dto::RateLimitStatsResponse;
pub use response::{ApiResponse, ErrorResponse};
