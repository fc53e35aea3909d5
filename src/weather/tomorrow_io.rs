//! Tomorrow.io timelines client.
//!
//! One GET per call for the `current` timestep; no retries.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

use super::{WeatherError, WeatherSource};
use crate::config::defaults;
use crate::types::{Coordinate, WeatherAttributes};

const FIELDS: &str = "temperature,humidity,precipitationIntensity";

// ============================================================================
// Response payload
// ============================================================================

#[derive(Debug, Deserialize)]
struct TimelinesResponse {
    data: TimelinesData,
}

#[derive(Debug, Deserialize)]
struct TimelinesData {
    timelines: Vec<Timeline>,
}

#[derive(Debug, Deserialize)]
struct Timeline {
    intervals: Vec<Interval>,
}

#[derive(Debug, Deserialize)]
struct Interval {
    values: IntervalValues,
}

#[derive(Debug, Deserialize)]
struct IntervalValues {
    temperature: Option<f64>,
    humidity: Option<f64>,
    #[serde(rename = "precipitationIntensity")]
    precipitation_intensity: Option<f64>,
}

/// Extract current conditions from a timelines payload.
///
/// The payload must contain `data.timelines[0].intervals[0].values`. Inside
/// that object an absent value takes its fallback default on its own.
pub fn parse_timelines(body: &[u8]) -> Result<WeatherAttributes, WeatherError> {
    let response: TimelinesResponse =
        serde_json::from_slice(body).map_err(|e| WeatherError::Malformed(e.to_string()))?;

    let values = response
        .data
        .timelines
        .into_iter()
        .next()
        .and_then(|t| t.intervals.into_iter().next())
        .map(|i| i.values)
        .ok_or_else(|| WeatherError::Malformed("no current interval in timelines".to_string()))?;

    let precipitation = values
        .precipitation_intensity
        .unwrap_or(defaults::FALLBACK_RAINFALL_MM);

    Ok(WeatherAttributes {
        temperature: values.temperature.unwrap_or(defaults::FALLBACK_TEMPERATURE_C),
        humidity: values.humidity.unwrap_or(defaults::FALLBACK_HUMIDITY_PCT),
        rainfall_1h: precipitation,
        rainfall_3h: precipitation * defaults::RAINFALL_3H_FACTOR,
    })
}

// ============================================================================
// Client
// ============================================================================

/// HTTP client for the Tomorrow.io timelines endpoint.
#[derive(Clone)]
pub struct TomorrowIoClient {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
}

impl std::fmt::Debug for TomorrowIoClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TomorrowIoClient")
            .field("api_url", &self.api_url)
            .finish_non_exhaustive()
    }
}

impl TomorrowIoClient {
    pub fn new(api_url: &str, api_key: &str, timeout: Duration) -> Result<Self, WeatherError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(WeatherError::Client)?;

        Ok(Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

#[async_trait]
impl WeatherSource for TomorrowIoClient {
    async fn current(&self, point: &Coordinate) -> Result<WeatherAttributes, WeatherError> {
        let location = format!("{},{}", point.latitude, point.longitude);
        // The key goes in the query string, so only the base URL is logged
        info!(url = %self.api_url, location = %location, "Requesting current weather");

        let resp = self
            .http
            .get(&self.api_url)
            .query(&[
                ("location", location.as_str()),
                ("fields", FIELDS),
                ("timesteps", "current"),
                ("units", "metric"),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(WeatherError::from_reqwest)?;

        let status = resp.status();
        info!(status = %status, "Weather API responded");
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(WeatherError::Status(status, truncate(&body, 200)));
        }

        let body = resp.bytes().await.map_err(WeatherError::from_reqwest)?;
        debug!(bytes = body.len(), "Weather payload received");
        parse_timelines(&body)
    }

    fn name(&self) -> &str {
        "tomorrow.io"
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}
