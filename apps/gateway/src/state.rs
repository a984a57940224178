//! Application state - shared across all handlers.

use std::sync::Arc;

use tollgate_core::{AdmissionController, CounterStoreError, RateLimitPolicy};
use tollgate_infra::counter_backend;

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub admission: Arc<AdmissionController>,
    pub policy: RateLimitPolicy,
}

impl AppState {
    /// Build the state. The counter store connects lazily on first request.
    pub fn new(config: &AppConfig) -> Result<Self, CounterStoreError> {
        let backend = counter_backend(&config.store)?;

        tracing::info!(configured = backend.is_configured(), "Application state initialized");

        Ok(Self {
            admission: Arc::new(AdmissionController::new(backend)),
            policy: config.policy,
        })
    }
}
