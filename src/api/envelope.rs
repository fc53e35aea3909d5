//! Response envelope for the `/api/v1` endpoints.
//!
//! Success: `{ "data": T, "meta": { "timestamp", "version" } }`
//! Failure: `{ "error": { "code", "message", "field"? }, "meta": { ... } }`
//!
//! Handlers return `Result<ApiResponse<T>, ApiErrorResponse>`; both sides
//! implement `IntoResponse`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::engine::EngineError;
use crate::types::CoordinateError;

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub timestamp: DateTime<Utc>,
    pub version: &'static str,
}

impl ResponseMeta {
    fn now() -> Self {
        Self {
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            meta: ResponseMeta::now(),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, axum::Json(self)).into_response()
    }
}

/// Machine-readable failure class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Missing, non-numeric, non-finite or out-of-range coordinate
    InvalidCoordinate,
    /// The centroid index could not answer (empty index)
    RegionLookupFailed,
}

impl ErrorCode {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::InvalidCoordinate => StatusCode::BAD_REQUEST,
            ErrorCode::RegionLookupFailed => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct ApiErrorResponse {
    pub error: ErrorDetail,
    pub meta: ResponseMeta,
}

impl ApiErrorResponse {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code,
                message: message.into(),
                field: None,
            },
            meta: ResponseMeta::now(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.error.code.status()
    }
}

impl From<CoordinateError> for ApiErrorResponse {
    fn from(e: CoordinateError) -> Self {
        let mut resp = Self::new(ErrorCode::InvalidCoordinate, e.to_string());
        resp.error.field = Some(e.field());
        resp
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::InvalidCoordinate(inner) => inner.into(),
            EngineError::Geo(inner) => {
                tracing::error!(error = %inner, "Region lookup failed");
                Self::new(ErrorCode::RegionLookupFailed, inner.to_string())
            }
        }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status(), axum::Json(self)).into_response()
    }
}
