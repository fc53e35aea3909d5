//! Recommendation endpoints: legacy form/JSON submit, enveloped recommend, nearest

use axum::extract::{FromRequest, Query, Request, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Form, Json};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use super::ApiState;
use crate::api::envelope::{ApiErrorResponse, ApiResponse};
use crate::engine::EngineError;
use crate::types::{parse_component, Coordinate, CoordinateError, RecommendationRecord};

// ============================================================================
// Request parsing
// ============================================================================

/// A coordinate component as sent by clients: a JSON number or numeric text.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LooseNumber {
    Number(f64),
    Text(String),
}

/// Body of `POST /submit` (JSON or urlencoded form).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmitRequest {
    pub latitude: Option<LooseNumber>,
    pub longitude: Option<LooseNumber>,
}

impl SubmitRequest {
    pub fn coordinate(&self) -> Result<Coordinate, CoordinateError> {
        let lat = component("latitude", self.latitude.as_ref())?;
        let lon = component("longitude", self.longitude.as_ref())?;
        Coordinate::new(lat, lon)
    }
}

fn component(field: &'static str, value: Option<&LooseNumber>) -> Result<f64, CoordinateError> {
    match value {
        None => Err(CoordinateError::Missing { field }),
        Some(LooseNumber::Number(n)) => Ok(*n),
        Some(LooseNumber::Text(s)) => parse_component(field, s),
    }
}

/// Query string of the GET endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CoordinateQuery {
    pub latitude: Option<String>,
    pub longitude: Option<String>,
}

impl CoordinateQuery {
    pub fn coordinate(&self) -> Result<Coordinate, CoordinateError> {
        let lat = self.latitude.as_deref().unwrap_or_default();
        let lon = self.longitude.as_deref().unwrap_or_default();
        Coordinate::parse(lat, lon)
    }
}

/// Flat error body used by the legacy endpoint: `{ "error": "..." }`
#[derive(Debug, Serialize)]
pub struct LegacyError {
    pub error: String,
}

fn legacy_error(status: StatusCode, msg: impl Into<String>) -> Response {
    (status, Json(LegacyError { error: msg.into() })).into_response()
}

async fn read_submit(state: &ApiState, req: Request) -> Result<SubmitRequest, String> {
    let is_json = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.trim_start().starts_with("application/json"));

    if is_json {
        Json::<SubmitRequest>::from_request(req, state)
            .await
            .map(|Json(body)| body)
            .map_err(|rejection| rejection.body_text())
    } else {
        Form::<SubmitRequest>::from_request(req, state)
            .await
            .map(|Form(body)| body)
            .map_err(|rejection| rejection.body_text())
    }
}

// ============================================================================
// Legacy submit
// ============================================================================

/// POST /submit - Recommend a crop for a coordinate (JSON or form body)
///
/// Responds with the flat record; 400 `{ "error" }` on bad input.
pub async fn submit(State(state): State<ApiState>, req: Request) -> Response {
    let body = match read_submit(&state, req).await {
        Ok(body) => body,
        Err(msg) => {
            warn!(error = %msg, "Rejected unreadable prediction request");
            return legacy_error(StatusCode::BAD_REQUEST, msg);
        }
    };

    let point = match body.coordinate() {
        Ok(point) => point,
        Err(e) => {
            warn!(error = %e, "Rejected invalid coordinate");
            return legacy_error(StatusCode::BAD_REQUEST, e.to_string());
        }
    };

    info!(point = %point, "Received prediction request");
    match state.engine.recommend_at(&point).await {
        Ok(record) => Json(record).into_response(),
        Err(e) => {
            error!(error = %e, "Recommendation failed");
            legacy_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

// ============================================================================
// v1 endpoints
// ============================================================================

/// GET /api/v1/recommend?latitude=..&longitude=..
pub async fn recommend(
    State(state): State<ApiState>,
    Query(query): Query<CoordinateQuery>,
) -> Result<ApiResponse<RecommendationRecord>, ApiErrorResponse> {
    let point = query.coordinate()?;
    let record = state.engine.recommend_at(&point).await?;
    Ok(ApiResponse::new(record))
}

/// Nearest region for a coordinate
#[derive(Debug, Serialize)]
pub struct NearestResponse {
    pub region_key: String,
    pub latitude: f64,
    pub longitude: f64,
    pub distance_km: f64,
    pub crop: String,
}

/// GET /api/v1/nearest?latitude=..&longitude=..
pub async fn nearest(
    State(state): State<ApiState>,
    Query(query): Query<CoordinateQuery>,
) -> Result<ApiResponse<NearestResponse>, ApiErrorResponse> {
    let point = query.coordinate()?;
    let nearest = state
        .engine
        .index()
        .nearest(&point)
        .map_err(EngineError::from)?;

    Ok(ApiResponse::new(NearestResponse {
        region_key: nearest.key().to_string(),
        latitude: nearest.centroid.location.latitude,
        longitude: nearest.centroid.location.longitude,
        distance_km: nearest.distance_km,
        crop: state.engine.crops().get(nearest.key()).to_string(),
    }))
}
