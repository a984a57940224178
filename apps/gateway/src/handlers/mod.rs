//! HTTP handlers and route configuration.

mod health;
mod stats;

use actix_web::web;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(health::health_check))
            .route("/rate-limit/stats", web::get().to(stats::rate_limit_stats)),
    );
}
