//! API route definitions
//!
//! - `/`, `/health`, `/submit` - flat legacy surface
//! - `/api/v1/recommend`, `/api/v1/nearest`, `/api/v1/status` - enveloped

use axum::{routing::{get, post}, Router};

use super::handlers::{self, ApiState};

/// Enveloped endpoints, nested under `/api/v1`
pub fn api_routes(state: ApiState) -> Router {
    Router::new()
        .route("/recommend", get(handlers::recommend))
        .route("/nearest", get(handlers::nearest))
        .route("/status", get(handlers::status))
        .with_state(state)
}

/// Root-level endpoints kept compatible with existing form clients
pub fn legacy_routes(state: ApiState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/submit", post(handlers::submit))
        .with_state(state)
}
