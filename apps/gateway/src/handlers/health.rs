//! Health check endpoint.

use actix_web::{HttpResponse, web};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: String,
    /// "enabled" when a counter store is configured, otherwise "fail-open".
    pub rate_limiting: &'static str,
}

/// Health check endpoint - returns server status.
///
/// GET /api/health
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let response = HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().to_rfc3339(),
        rate_limiting: if state.admission.is_configured() {
            "enabled"
        } else {
            "fail-open"
        },
    };

    HttpResponse::Ok().json(response)
}
