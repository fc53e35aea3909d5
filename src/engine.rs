//! Recommendation engine
//!
//! Composes the centroid index, soil resolver, weather resolver and crop
//! assignment into one record per coordinate:
//!
//! ```text
//! coordinate ─┬─> CentroidIndex::nearest ─> region key ─┬─> SoilResolver
//!             │                                        └─> CropAssignment
//!             └─> WeatherResolver (raw coordinate)
//! ```
//!
//! Every shared part is immutable after [`RecommendationEngine::new`], so one
//! engine behind an `Arc` serves concurrent requests without locking.

use anyhow::Context;
use thiserror::Error;
use tracing::info;

use crate::config::AdvisorConfig;
use crate::crops::{CropAssignment, CropError};
use crate::geo::{CentroidIndex, GeoError};
use crate::soil::{SoilDataset, SoilResolver};
use crate::types::{Coordinate, CoordinateError, RecommendationRecord};
use crate::weather::WeatherResolver;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(#[from] CoordinateError),
    #[error(transparent)]
    Geo(#[from] GeoError),
}

/// Counts describing the loaded reference data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct EngineSummary {
    pub centroids: usize,
    pub soil_regions: usize,
    pub soil_rows: usize,
    pub assigned_regions: usize,
    pub crop_pool: usize,
    pub live_weather: bool,
}

/// Geo-resolution and recommendation engine.
#[derive(Debug)]
pub struct RecommendationEngine {
    index: CentroidIndex,
    soil: SoilResolver,
    weather: WeatherResolver,
    crops: CropAssignment,
}

impl RecommendationEngine {
    /// Assemble an engine, building the crop assignment over the index keys.
    pub fn new(
        index: CentroidIndex,
        soil: SoilResolver,
        weather: WeatherResolver,
        crop_pool: &[String],
        crop_seed: Option<u64>,
    ) -> Result<Self, CropError> {
        let crops = CropAssignment::build(index.keys(), crop_pool, crop_seed)?;
        Ok(Self::from_parts(index, soil, weather, crops))
    }

    pub fn from_parts(
        index: CentroidIndex,
        soil: SoilResolver,
        weather: WeatherResolver,
        crops: CropAssignment,
    ) -> Self {
        Self {
            index,
            soil,
            weather,
            crops,
        }
    }

    /// Load every dataset named by `config` and build the engine.
    ///
    /// Structural problems (unreadable files, empty index, empty crop pool)
    /// fail here, at startup, never per request.
    pub fn from_config(config: &AdvisorConfig) -> anyhow::Result<Self> {
        let index = CentroidIndex::load(&config.data.centroids_path).with_context(|| {
            format!(
                "Failed to load centroids from {}",
                config.data.centroids_path.display()
            )
        })?;
        let soil = SoilDataset::load(&config.data.soil_path).with_context(|| {
            format!(
                "Failed to load soil dataset from {}",
                config.data.soil_path.display()
            )
        })?;
        let weather =
            WeatherResolver::from_config(&config.weather).context("Failed to set up weather client")?;

        let engine = Self::new(
            index,
            SoilResolver::new(soil),
            weather,
            &config.crops.pool,
            config.crops.seed,
        )
        .context("Failed to build crop assignment")?;

        let summary = engine.summary();
        info!(
            centroids = summary.centroids,
            soil_regions = summary.soil_regions,
            crop_pool = summary.crop_pool,
            live_weather = summary.live_weather,
            "Recommendation engine ready"
        );
        Ok(engine)
    }

    /// Validate raw input and recommend a crop for it.
    pub async fn recommend(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<RecommendationRecord, EngineError> {
        let point = Coordinate::new(latitude, longitude)?;
        self.recommend_at(&point).await
    }

    /// Recommend a crop for an already validated coordinate.
    pub async fn recommend_at(&self, point: &Coordinate) -> Result<RecommendationRecord, EngineError> {
        let nearest = self.index.nearest(point)?;
        let region_key = nearest.key();
        info!(
            point = %point,
            region = %region_key,
            distance_km = nearest.distance_km,
            "Nearest region resolved"
        );

        // Soil needs the region key, weather only the raw coordinate
        let soil = self.soil.resolve_detailed(region_key);
        let weather = self.weather.resolve(point).await;
        let crop = self.crops.get(region_key);

        info!(
            region = %region_key,
            crop = %crop,
            weather = ?weather.origin,
            soil_matched = soil.matched,
            soil_synthesized = soil.synthesized.len(),
            "Recommended crop"
        );

        Ok(RecommendationRecord {
            latitude: point.latitude,
            longitude: point.longitude,
            region_key: region_key.to_string(),
            temperature: weather.attributes.temperature,
            humidity: weather.attributes.humidity,
            rainfall_1h: weather.attributes.rainfall_1h,
            rainfall_3h: weather.attributes.rainfall_3h,
            weather_source: weather.origin,
            crop: crop.to_string(),
            soil_data: soil.attributes,
            soil_synthesized: soil.synthesized,
        })
    }

    pub fn index(&self) -> &CentroidIndex {
        &self.index
    }

    pub fn soil(&self) -> &SoilResolver {
        &self.soil
    }

    pub fn crops(&self) -> &CropAssignment {
        &self.crops
    }

    pub fn weather(&self) -> &WeatherResolver {
        &self.weather
    }

    pub fn summary(&self) -> EngineSummary {
        EngineSummary {
            centroids: self.index.len(),
            soil_regions: self.soil.dataset().len(),
            soil_rows: self.soil.dataset().rows_read(),
            assigned_regions: self.crops.len(),
            crop_pool: self.crops.pool_size(),
            live_weather: self.weather.is_live(),
        }
    }
}
