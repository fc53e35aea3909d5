//! Crop Advisor: location-based crop recommendation
//!
//! Resolves a coordinate to its nearest soil region and produces one
//! recommendation record per query.
//!
//! ## Architecture
//!
//! - **Geo**: nearest-centroid search over region centroids
//! - **Soil**: dataset lookup with deterministic per-region synthesis
//! - **Weather**: live provider with a fixed fallback record
//! - **Crops**: exhaustible-pool region -> crop assignment
//! - **Engine**: composes the above; **API** serves it over HTTP

pub mod api;
pub mod config;
pub mod crops;
pub mod engine;
pub mod geo;
pub mod soil;
pub mod types;
pub mod weather;

// Re-export configuration
pub use config::AdvisorConfig;

// Re-export commonly used types
pub use types::{
    Coordinate, CoordinateError, RecommendationRecord, SoilAttributes, WeatherAttributes,
    WeatherOrigin,
};

// Re-export the engine and its parts
pub use crops::{CropAssignment, CropError};
pub use engine::{EngineError, EngineSummary, RecommendationEngine};
pub use geo::{CentroidIndex, GeoError};
pub use soil::{SoilDataset, SoilResolver};
pub use weather::{WeatherResolver, WeatherSource};
