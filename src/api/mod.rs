//! REST API module using Axum
//!
//! Serves crop recommendations over HTTP:
//! - legacy root endpoints (`/submit` accepts JSON or form bodies)
//! - `/api/v1` endpoints wrapped in the [`envelope`] response shape

pub mod envelope;
pub mod handlers;
mod routes;

pub use handlers::ApiState;

use axum::http::{header, HeaderValue, Method};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the CORS layer from configured origins.
///
/// Empty means same-origin only; a single `*` allows any origin.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    if origins.iter().any(|o| o.trim() == "*") {
        tracing::info!("CORS: allowing any origin");
        return base.allow_origin(Any);
    }
    if origins.is_empty() {
        return base;
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.trim().parse() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = %o, "CORS: ignoring invalid origin");
                None
            }
        })
        .collect();
    tracing::info!(origins = ?origins, "CORS: allowing configured origins");
    base.allow_origin(allowed)
}

/// Create the complete application router.
pub fn create_app(state: ApiState, cors_origins: &[String]) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes(state.clone()))
        .merge(routes::legacy_routes(state))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(cors_origins))
}
