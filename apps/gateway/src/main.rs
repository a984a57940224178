//! # Tollgate Gateway
//!
//! Actix-web server that admits or rejects `/api/` requests per client and path.

use actix_web::{App, HttpServer, web};
use tracing_actix_web::TracingLogger;

mod config;
mod handlers;
mod middleware;
mod state;
mod telemetry;

use config::AppConfig;
use middleware::rate_limit::RateLimitMiddleware;
use state::AppState;
use telemetry::TelemetryConfig;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    telemetry::init_telemetry(&TelemetryConfig::from_env());

    // Invalid policy or endpoint is a deployment bug: refuse to start.
    let config = AppConfig::from_env().map_err(std::io::Error::other)?;
    let state = AppState::new(&config).map_err(std::io::Error::other)?;

    tracing::info!(
        host = %config.host,
        port = config.port,
        window_seconds = config.policy.window_seconds(),
        max_requests = config.policy.max_requests(),
        rate_limiting = state.admission.is_configured(),
        "Starting Tollgate gateway"
    );

    HttpServer::new(move || {
        App::new()
            .wrap(RateLimitMiddleware::new(
                state.admission.clone(),
                state.policy,
            ))
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(state.clone()))
            .configure(handlers::configure_routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
