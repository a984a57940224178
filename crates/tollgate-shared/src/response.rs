//! Standardized API response types (RFC 7807 compliant for errors).

use serde::{Deserialize, Serialize};

/// Standard successful API response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
        }
    }
}

/// RFC 7807 Problem Details for HTTP APIs.
///
/// See: https://datatracker.ietf.org/doc/html/rfc7807
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// A URI reference that identifies the problem type.
    #[serde(rename = "type")]
    pub error_type: String,

    /// A short, human-readable summary of the problem type.
    pub title: String,

    /// The HTTP status code.
    pub status: u16,

    /// A human-readable explanation specific to this occurrence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// A URI reference that identifies the specific occurrence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,

    /// Seconds until the client may retry (rate limit extension member).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset_in: Option<u64>,
}

impl ErrorResponse {
    pub fn new(status: u16, title: impl Into<String>) -> Self {
        Self {
            error_type: "about:blank".to_string(),
            title: title.into(),
            status,
            detail: None,
            instance: None,
            reset_in: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_instance(mut self, instance: impl Into<String>) -> Self {
        self.instance = Some(instance.into());
        self
    }

    pub fn too_many_requests(reset_in: u64) -> Self {
        let mut error = Self::new(429, "Too Many Requests").with_detail(format!(
            "Rate limit exceeded. Try again in {} seconds.",
            reset_in
        ));
        error.error_type = "rate_limited".to_string();
        error.reset_in = Some(reset_in);
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_too_many_requests_body() {
        let body = ErrorResponse::too_many_requests(7).with_instance("/api/generate");
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["type"], "rate_limited");
        assert_eq!(json["status"], 429);
        assert_eq!(json["reset_in"], 7);
        assert_eq!(json["instance"], "/api/generate");
    }

    #[test]
    fn test_api_response_ok() {
        let json = serde_json::to_value(ApiResponse::ok(3)).unwrap();

        assert_eq!(json["success"], true);
        assert_eq!(json["data"], 3);
    }

    #[test]
    fn test_optional_members_are_omitted() {
        let json = serde_json::to_value(ErrorResponse::new(400, "Bad Request")).unwrap();

        assert!(json.get("detail").is_none());
        assert!(json.get("reset_in").is_none());
    }
}
