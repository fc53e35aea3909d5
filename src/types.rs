//! Core value types shared by the resolvers, the engine and the API.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::defaults;
use crate::soil::SoilField;

// ============================================================================
// Coordinate
// ============================================================================

/// A validated WGS84 point.
///
/// Construct with [`Coordinate::new`]; both components are guaranteed finite
/// and inside [-90, 90] / [-180, 180].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

/// Rejected caller input. A client error, never a resolution failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordinateError {
    #[error("{field} is required")]
    Missing { field: &'static str },
    #[error("{field} must be a number, got {raw:?}")]
    NotANumber { field: &'static str, raw: String },
    #[error("{field} must be finite, got {value}")]
    NotFinite { field: &'static str, value: f64 },
    #[error("{field} {value} is outside [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        check_component("latitude", latitude, 90.0)?;
        check_component("longitude", longitude, 180.0)?;
        Ok(Self { latitude, longitude })
    }

    /// Parse caller-supplied text, as sent by HTML forms and query strings.
    pub fn parse(latitude: &str, longitude: &str) -> Result<Self, CoordinateError> {
        let lat = parse_component("latitude", latitude)?;
        let lon = parse_component("longitude", longitude)?;
        Self::new(lat, lon)
    }
}

impl CoordinateError {
    /// Name of the offending component.
    pub fn field(&self) -> &'static str {
        match self {
            CoordinateError::Missing { field }
            | CoordinateError::NotANumber { field, .. }
            | CoordinateError::NotFinite { field, .. }
            | CoordinateError::OutOfRange { field, .. } => field,
        }
    }
}

pub(crate) fn parse_component(field: &'static str, raw: &str) -> Result<f64, CoordinateError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CoordinateError::Missing { field });
    }
    trimmed.parse::<f64>().map_err(|_| CoordinateError::NotANumber {
        field,
        raw: raw.to_string(),
    })
}

fn check_component(field: &'static str, value: f64, limit: f64) -> Result<(), CoordinateError> {
    // NaN/Inf comparisons silently pass range checks, catch them first
    if !value.is_finite() {
        return Err(CoordinateError::NotFinite { field, value });
    }
    if !(-limit..=limit).contains(&value) {
        return Err(CoordinateError::OutOfRange {
            field,
            value,
            min: -limit,
            max: limit,
        });
    }
    Ok(())
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}

// ============================================================================
// Soil
// ============================================================================

/// Fully populated soil properties for one region, rounded to 2 decimals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoilAttributes {
    #[serde(rename = "pH")]
    pub ph: f64,
    #[serde(rename = "Clay_Content")]
    pub clay: f64,
    #[serde(rename = "Sand_Content")]
    pub sand: f64,
    #[serde(rename = "Silt_Content")]
    pub silt: f64,
    #[serde(rename = "CEC")]
    pub cec: f64,
}

// ============================================================================
// Weather
// ============================================================================

/// Current conditions at a coordinate. Always fully populated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherAttributes {
    /// Air temperature (°C)
    pub temperature: f64,
    /// Relative humidity (%)
    pub humidity: f64,
    /// Precipitation over the last hour (mm)
    pub rainfall_1h: f64,
    /// 3 × the current precipitation intensity (mm)
    pub rainfall_3h: f64,
}

impl WeatherAttributes {
    /// The fixed record served when live data is unavailable.
    pub const FALLBACK: Self = Self {
        temperature: defaults::FALLBACK_TEMPERATURE_C,
        humidity: defaults::FALLBACK_HUMIDITY_PCT,
        rainfall_1h: defaults::FALLBACK_RAINFALL_MM,
        rainfall_3h: defaults::FALLBACK_RAINFALL_MM,
    };
}

/// Where a [`WeatherAttributes`] value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherOrigin {
    /// Parsed from a successful provider response
    Live,
    /// Provider call failed, fixed record served
    Fallback,
    /// No credential configured, fixed record served
    Mock,
}

// ============================================================================
// Recommendation
// ============================================================================

/// Combined feature record and crop label for one coordinate query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationRecord {
    pub latitude: f64,
    pub longitude: f64,
    /// Region whose centroid is nearest to the query point
    pub region_key: String,
    pub temperature: f64,
    pub humidity: f64,
    pub rainfall_1h: f64,
    pub rainfall_3h: f64,
    pub weather_source: WeatherOrigin,
    pub crop: String,
    pub soil_data: SoilAttributes,
    /// Soil fields filled by seeded synthesis rather than the dataset
    #[serde(default)]
    pub soil_synthesized: Vec<SoilField>,
}

impl RecommendationRecord {
    pub fn weather(&self) -> WeatherAttributes {
        WeatherAttributes {
            temperature: self.temperature,
            humidity: self.humidity,
            rainfall_1h: self.rainfall_1h,
            rainfall_3h: self.rainfall_3h,
        }
    }
}

/// Round to 2 decimal places.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
