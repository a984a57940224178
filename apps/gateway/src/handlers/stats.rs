use actix_web::{HttpResponse, web};
use tollgate_shared::{ApiResponse, RateLimitStatsResponse};

use crate::state::AppState;

/// GET /api/rate-limit/stats
pub async fn rate_limit_stats(state: web::Data<AppState>) -> HttpResponse {
    let stats = state.admission.stats();

    HttpResponse::Ok().json(ApiResponse::ok(RateLimitStatsResponse {
        configured: state.admission.is_configured(),
        admitted: stats.admitted,
        denied: stats.denied,
        degraded_not_configured: stats.degraded_not_configured,
        degraded_store_error: stats.degraded_store_error,
    }))
}
