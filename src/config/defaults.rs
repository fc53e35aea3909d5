//! System-wide default constants.
//!
//! Centralises the fixed numbers the resolvers depend on.
//! Grouped by subsystem for easy discovery.

// ============================================================================
// Server
// ============================================================================

/// Default HTTP bind address.
pub const SERVER_ADDR: &str = "0.0.0.0:5000";

// ============================================================================
// Data
// ============================================================================

/// Region centroid mapping (`{ "<key>": [lat, lon] }`).
pub const CENTROIDS_PATH: &str = "mu_global_centroids.json";

/// Harmonized soil properties table.
pub const SOIL_PATH: &str = "data/HWSD_DATA.csv";

// ============================================================================
// Soil Fallback Ranges
// ============================================================================

/// Synthesized pH range (inclusive).
pub const PH_RANGE: (f64, f64) = (4.0, 9.0);

/// Synthesized clay content range (%).
pub const CLAY_RANGE: (f64, f64) = (5.0, 40.0);

/// Synthesized sand content range (%).
pub const SAND_RANGE: (f64, f64) = (10.0, 70.0);

/// Synthesized silt content range (%).
pub const SILT_RANGE: (f64, f64) = (5.0, 50.0);

/// Synthesized cation exchange capacity range (cmol/kg).
pub const CEC_RANGE: (f64, f64) = (5.0, 50.0);

// ============================================================================
// Weather
// ============================================================================

/// Tomorrow.io timelines endpoint.
pub const WEATHER_API_URL: &str = "https://api.tomorrow.io/v4/timelines";

/// Hard timeout for the single weather request (seconds).
pub const WEATHER_TIMEOUT_SECS: u64 = 10;

/// Fallback temperature (°C) used when live weather is unavailable.
pub const FALLBACK_TEMPERATURE_C: f64 = 25.0;

/// Fallback relative humidity (%).
pub const FALLBACK_HUMIDITY_PCT: f64 = 60.0;

/// Fallback rainfall (mm), applied to both the 1h and 3h figures.
pub const FALLBACK_RAINFALL_MM: f64 = 0.0;

/// Multiplier that turns precipitation intensity (mm/h) into the 3h figure.
///
/// Linear extrapolation of the current intensity, not a true accumulation.
pub const RAINFALL_3H_FACTOR: f64 = 3.0;

// ============================================================================
// Crops
// ============================================================================

/// Label returned for a region that has no assignment.
pub const UNKNOWN_CROP: &str = "Unknown Crop";

/// Built-in crop pool.
pub const CROP_POOL: &[&str] = &[
    "Onion", "Tomato", "Corn", "Wheat", "Potato", "Rice", "Soybean", "Barley",
    "Lettuce", "Cabbage", "Carrot", "Pepper", "Eggplant", "Spinach", "Peas",
    "Chickpea", "Garlic", "Broccoli", "Cauliflower", "Radish", "Turnip",
    "Sweet Potato", "Sugarcane", "Cotton", "Sunflower", "Millet", "Sorghum",
    "Mustard", "Flax", "Cassava", "Ginger", "Turmeric", "Papaya", "Mango",
    "Banana", "Grapes", "Apple", "Pear", "Peach", "Pineapple", "Cucumber",
];
