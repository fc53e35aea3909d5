//! API route handlers
//!
//! - Service info and health
//! - Crop recommendation (legacy `/submit` and enveloped `/api/v1/recommend`)
//! - Nearest-region lookup and reference data status

mod recommend;
mod service;

pub use recommend::*;
pub use service::*;

use std::sync::Arc;
use std::time::Instant;

use crate::engine::RecommendationEngine;

// ============================================================================
// API State
// ============================================================================

/// Shared state for API handlers
#[derive(Clone)]
pub struct ApiState {
    /// Immutable engine shared by every request
    pub engine: Arc<RecommendationEngine>,
    /// Process start, for uptime reporting
    pub started_at: Instant,
}

impl ApiState {
    pub fn new(engine: Arc<RecommendationEngine>) -> Self {
        Self {
            engine,
            started_at: Instant::now(),
        }
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
