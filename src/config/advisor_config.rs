//! Advisor Configuration - data locations, weather provider, crop pool
//!
//! Every section implements `Default` with the built-in values from
//! [`defaults`](super::defaults), so a missing config file changes nothing.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use super::defaults;

/// Environment variable pointing at a TOML config file.
pub const CONFIG_ENV_VAR: &str = "CROP_ADVISOR_CONFIG";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "crop_advisor.toml";

/// Environment variable carrying the Tomorrow.io API key.
pub const WEATHER_API_KEY_ENV_VAR: &str = "TOMORROW_IO_API_KEY";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for an advisor deployment.
///
/// Load with `AdvisorConfig::load()` which searches:
/// 1. `$CROP_ADVISOR_CONFIG` env var
/// 2. `./crop_advisor.toml`
/// 3. Built-in defaults
///
/// Environment overrides (`TOMORROW_IO_API_KEY`, `PORT`) are applied
/// afterwards by [`AdvisorConfig::apply_env_overrides`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdvisorConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Reference dataset locations
    #[serde(default)]
    pub data: DataConfig,

    /// External weather provider
    #[serde(default)]
    pub weather: WeatherConfig,

    /// Crop pool and assignment seeding
    #[serde(default)]
    pub crops: CropConfig,
}

impl AdvisorConfig {
    /// Load configuration using the standard search order.
    pub fn load() -> Self {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded advisor config from {}", CONFIG_ENV_VAR);
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from {}, falling back", CONFIG_ENV_VAR);
                    }
                }
            } else {
                warn!(path = %path, "{} points to non-existent file, falling back", CONFIG_ENV_VAR);
            }
        }

        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded advisor config from ./{}", LOCAL_CONFIG_FILE);
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./{}, using defaults", LOCAL_CONFIG_FILE);
                }
            }
        }

        info!("No {} found, using built-in defaults", LOCAL_CONFIG_FILE);
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse(_, inner) => ConfigError::Parse(path.to_path_buf(), inner),
            other => other,
        })
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(PathBuf::new(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Apply process environment overrides on top of file values.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(
            std::env::var(WEATHER_API_KEY_ENV_VAR).ok(),
            std::env::var("PORT").ok(),
        );
    }

    /// Override the API key and the bind port.
    ///
    /// Blank keys are ignored. A port that does not parse as `u16` is ignored
    /// with a warning.
    pub fn apply_overrides(&mut self, api_key: Option<String>, port: Option<String>) {
        if let Some(key) = api_key.filter(|k| !k.trim().is_empty()) {
            self.weather.api_key = Some(key);
        }

        if let Some(port) = port {
            match port.trim().parse::<u16>() {
                Ok(p) => {
                    let current = self.server.addr.trim();
                    let host = match current.rsplit_once(':') {
                        Some((host, _)) => host,
                        None if !current.is_empty() => current,
                        None => "0.0.0.0",
                    };
                    self.server.addr = format!("{host}:{p}");
                }
                Err(_) => warn!(port = %port, "Ignoring unparseable PORT"),
            }
        }
    }

    /// Serialize back to TOML (used by `--print-config`).
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Validate values that the engine cannot start without.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = Vec::new();

        if self.server.addr.trim().is_empty() {
            errors.push("server.addr: must not be empty".to_string());
        }
        if self.data.centroids_path.as_os_str().is_empty() {
            errors.push("data.centroids_path: must not be empty".to_string());
        }
        if self.data.soil_path.as_os_str().is_empty() {
            errors.push("data.soil_path: must not be empty".to_string());
        }
        if self.weather.timeout_secs == 0 {
            errors.push("weather.timeout_secs: must be > 0".to_string());
        }
        if self.weather.api_url.trim().is_empty() {
            errors.push("weather.api_url: must not be empty".to_string());
        }
        if self.crops.pool.is_empty() {
            errors.push("crops.pool: must contain at least one crop".to_string());
        }
        for (i, name) in self.crops.pool.iter().enumerate() {
            if name.trim().is_empty() {
                errors.push(format!("crops.pool[{i}]: crop name must not be blank"));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(PathBuf, toml::de::Error),
    Serialize(toml::ser::Error),
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "Config I/O error ({}): {}", path.display(), e),
            ConfigError::Parse(path, e) => {
                write!(f, "Config parse error ({}): {}", path.display(), e)
            }
            ConfigError::Serialize(e) => write!(f, "Config serialization error: {}", e),
            ConfigError::Validation(errors) => {
                writeln!(f, "Config validation failed:")?;
                for e in errors {
                    writeln!(f, "  - {}", e)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Server
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server bind address.
    ///
    /// Can be overridden by the `PORT` env var or the `--addr` CLI flag.
    #[serde(default = "default_server_addr")]
    pub addr: String,

    /// Origins allowed to call the API cross-origin. Empty means same-origin only.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_server_addr() -> String {
    defaults::SERVER_ADDR.to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_server_addr(),
            cors_origins: Vec::new(),
        }
    }
}

// ============================================================================
// Data
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// JSON file mapping region keys to `[lat, lon]` centroids
    #[serde(default = "default_centroids_path")]
    pub centroids_path: PathBuf,

    /// CSV file with per-region soil properties
    #[serde(default = "default_soil_path")]
    pub soil_path: PathBuf,
}

fn default_centroids_path() -> PathBuf {
    PathBuf::from(defaults::CENTROIDS_PATH)
}
fn default_soil_path() -> PathBuf {
    PathBuf::from(defaults::SOIL_PATH)
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            centroids_path: default_centroids_path(),
            soil_path: default_soil_path(),
        }
    }
}

// ============================================================================
// Weather
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Timelines endpoint of the weather provider
    #[serde(default = "default_weather_api_url")]
    pub api_url: String,

    /// Provider credential. When absent the resolver serves mock weather.
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_weather_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_weather_api_url() -> String {
    defaults::WEATHER_API_URL.to_string()
}
fn default_weather_timeout_secs() -> u64 {
    defaults::WEATHER_TIMEOUT_SECS
}

impl WeatherConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// The configured key, if it is not blank.
    pub fn credential(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.trim().is_empty())
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_url: default_weather_api_url(),
            api_key: None,
            timeout_secs: default_weather_timeout_secs(),
        }
    }
}

// ============================================================================
// Crops
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CropConfig {
    /// Candidate crop labels, assigned to regions without repetition until exhausted
    #[serde(default = "default_crop_pool")]
    pub pool: Vec<String>,

    /// Seed for the assignment shuffle. Unset means a fresh assignment every start.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_crop_pool() -> Vec<String> {
    defaults::CROP_POOL.iter().map(|c| (*c).to_string()).collect()
}

impl Default for CropConfig {
    fn default() -> Self {
        Self {
            pool: default_crop_pool(),
            seed: None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        let config = AdvisorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.crops.pool.len(), 41);
        assert_eq!(config.weather.timeout_secs, 10);
        assert!(config.weather.credential().is_none());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AdvisorConfig::from_toml_str(
            r#"
[crops]
pool = ["Rice", "Millet"]
seed = 7
"#,
        )
        .unwrap();
        assert_eq!(config.crops.pool, vec!["Rice", "Millet"]);
        assert_eq!(config.crops.seed, Some(7));
        assert_eq!(config.server.addr, "0.0.0.0:5000");
        assert_eq!(config.data.soil_path, PathBuf::from("data/HWSD_DATA.csv"));
    }

    #[test]
    fn test_empty_pool_rejected() {
        let err = AdvisorConfig::from_toml_str("[crops]\npool = []\n").unwrap_err();
        match err {
            ConfigError::Validation(errors) => {
                assert!(errors.iter().any(|e| e.contains("crops.pool")));
            }
            other => panic!("expected validation error, got {other}"),
        }
    }

    #[test]
    fn test_zero_timeout_and_blank_crop_rejected() {
        let err = AdvisorConfig::from_toml_str(
            "[weather]\ntimeout_secs = 0\n[crops]\npool = [\"Rice\", \"  \"]\n",
        )
        .unwrap_err();
        let ConfigError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let err = AdvisorConfig::from_toml_str("[server\naddr = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_, _)));
    }

    #[test]
    fn test_overrides_replace_key_and_port() {
        let mut config = AdvisorConfig::default();
        config.apply_overrides(Some("secret".to_string()), Some("8081".to_string()));
        assert_eq!(config.weather.api_key.as_deref(), Some("secret"));
        assert_eq!(config.server.addr, "0.0.0.0:8081");
        assert!(config.weather.credential().is_some());
    }

    #[test]
    fn test_port_override_keeps_bare_host() {
        let mut config = AdvisorConfig::default();
        config.server.addr = "localhost".to_string();
        config.apply_overrides(None, Some("9090".to_string()));
        assert_eq!(config.server.addr, "localhost:9090");

        config.server.addr = "127.0.0.1:5000".to_string();
        config.apply_overrides(None, Some("9091".to_string()));
        assert_eq!(config.server.addr, "127.0.0.1:9091");
    }

    #[test]
    fn test_credential_ignores_blank_key() {
        let mut config = AdvisorConfig::default();
        config.weather.api_key = Some("  ".to_string());
        assert_eq!(config.weather.credential(), None);
        assert!(config.weather.credential().is_none());

        config.weather.api_key = Some("abc".to_string());
        assert_eq!(config.weather.credential(), Some("abc"));
    }

    #[test]
    fn test_blank_key_and_bad_port_ignored() {
        let mut config = AdvisorConfig::default();
        config.apply_overrides(Some("   ".to_string()), Some("not-a-port".to_string()));
        assert!(config.weather.api_key.is_none());
        assert_eq!(config.server.addr, "0.0.0.0:5000");
    }

    #[test]
    fn test_api_key_never_serialized() {
        let mut config = AdvisorConfig::default();
        config.weather.api_key = Some("secret".to_string());
        let rendered = config.to_toml().unwrap();
        assert!(!rendered.contains("secret"));
    }

    #[test]
    fn test_load_from_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[weather]\ntimeout_secs = \"ten\"\n").unwrap();
        let err = AdvisorConfig::load_from_file(&path).unwrap_err();
        match err {
            ConfigError::Parse(p, _) => assert_eq!(p, path),
            other => panic!("expected parse error, got {other}"),
        }
    }
}
