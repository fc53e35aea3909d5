//! Weather attribute resolution.
//!
//! [`WeatherResolver`] is total: it always yields a complete
//! [`WeatherAttributes`]. Provider failures of any kind (timeout, non-OK
//! status, transport error, malformed payload) are logged and replaced by
//! [`WeatherAttributes::FALLBACK`]. Without a credential the resolver never
//! calls out and serves the same record tagged as mock data.

mod tomorrow_io;

pub use tomorrow_io::{parse_timelines, TomorrowIoClient};

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::config::WeatherConfig;
use crate::types::{Coordinate, WeatherAttributes, WeatherOrigin};

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("HTTP error: {0}")]
    Http(#[source] reqwest::Error),
    #[error("request timed out")]
    Timeout,
    #[error("weather service returned status {0}: {1}")]
    Status(reqwest::StatusCode, String),
    #[error("malformed weather payload: {0}")]
    Malformed(String),
}

impl WeatherError {
    /// Wrap a transport error. The request URL carries the API key in its
    /// query string, so it is stripped before the error can be displayed.
    fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            WeatherError::Timeout
        } else {
            WeatherError::Http(e.without_url())
        }
    }
}

/// A provider of current conditions.
#[async_trait]
pub trait WeatherSource: Send + Sync + 'static {
    async fn current(&self, point: &Coordinate) -> Result<WeatherAttributes, WeatherError>;

    /// Human-readable name for logging.
    fn name(&self) -> &str;
}

/// Weather attributes with their origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherReading {
    pub attributes: WeatherAttributes,
    pub origin: WeatherOrigin,
}

/// Total-function weather lookup over an optional live source.
#[derive(Clone)]
pub struct WeatherResolver {
    source: Option<Arc<dyn WeatherSource>>,
    timeout: Duration,
}

impl std::fmt::Debug for WeatherResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherResolver")
            .field("source", &self.source.as_ref().map(|s| s.name().to_string()))
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl WeatherResolver {
    /// Resolver with no credential: always serves mock weather.
    pub fn mock() -> Self {
        Self {
            source: None,
            timeout: Duration::from_secs(crate::config::defaults::WEATHER_TIMEOUT_SECS),
        }
    }

    /// Resolver over a live source, bounded by `timeout` per call.
    pub fn new(source: Arc<dyn WeatherSource>, timeout: Duration) -> Self {
        Self {
            source: Some(source),
            timeout,
        }
    }

    /// Tomorrow.io when a credential is configured, mock otherwise.
    pub fn from_config(config: &WeatherConfig) -> Result<Self, WeatherError> {
        match config.credential() {
            Some(key) => {
                let client = TomorrowIoClient::new(&config.api_url, key, config.timeout())?;
                info!(url = %client.api_url(), timeout_secs = config.timeout_secs, "Live weather enabled");
                Ok(Self::new(Arc::new(client), config.timeout()))
            }
            None => {
                warn!("No weather API key configured, weather data will use mock values");
                Ok(Self::mock())
            }
        }
    }

    pub fn is_live(&self) -> bool {
        self.source.is_some()
    }

    /// Current conditions at `point`. Never fails.
    pub async fn resolve(&self, point: &Coordinate) -> WeatherReading {
        let Some(source) = &self.source else {
            return WeatherReading {
                attributes: WeatherAttributes::FALLBACK,
                origin: WeatherOrigin::Mock,
            };
        };

        let outcome = match tokio::time::timeout(self.timeout, source.current(point)).await {
            Ok(result) => result,
            Err(_) => Err(WeatherError::Timeout),
        };

        match outcome {
            Ok(attributes) => {
                info!(source = source.name(), point = %point, ?attributes, "Live weather resolved");
                WeatherReading {
                    attributes,
                    origin: WeatherOrigin::Live,
                }
            }
            Err(e) => {
                error!(source = source.name(), point = %point, error = %e, "Weather lookup failed, using fallback");
                WeatherReading {
                    attributes: WeatherAttributes::FALLBACK,
                    origin: WeatherOrigin::Fallback,
                }
            }
        }
    }
}
