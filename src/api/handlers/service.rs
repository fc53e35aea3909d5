//! Service endpoints: index, health, status

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::ApiState;
use crate::api::envelope::ApiResponse;
use crate::engine::EngineSummary;

// ============================================================================
// Index
// ============================================================================

#[derive(Debug, Serialize)]
pub struct EndpointList {
    pub prediction: &'static str,
    pub recommend: &'static str,
    pub nearest: &'static str,
    pub status: &'static str,
    pub health: &'static str,
}

#[derive(Debug, Serialize)]
pub struct IndexResponse {
    pub message: &'static str,
    pub version: &'static str,
    pub endpoints: EndpointList,
}

/// GET / - Service banner and endpoint list
pub async fn index() -> Json<IndexResponse> {
    Json(IndexResponse {
        message: "Crop Prediction API is running",
        version: env!("CARGO_PKG_VERSION"),
        endpoints: EndpointList {
            prediction: "/submit (POST)",
            recommend: "/api/v1/recommend (GET)",
            nearest: "/api/v1/nearest (GET)",
            status: "/api/v1/status (GET)",
            health: "/health (GET)",
        },
    })
}

// ============================================================================
// Health
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub uptime_seconds: u64,
}

/// GET /health - Liveness check
pub async fn health(State(state): State<ApiState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        timestamp: Utc::now(),
        uptime_seconds: state.uptime_secs(),
    })
}

// ============================================================================
// Status
// ============================================================================

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    #[serde(flatten)]
    pub summary: EngineSummary,
    pub weather_mode: &'static str,
    pub uptime_seconds: u64,
}

/// GET /api/v1/status - Reference data counts and weather mode
pub async fn status(State(state): State<ApiState>) -> ApiResponse<StatusResponse> {
    let summary = state.engine.summary();
    ApiResponse::new(StatusResponse {
        summary,
        weather_mode: if summary.live_weather { "live" } else { "mock" },
        uptime_seconds: state.uptime_secs(),
    })
}
