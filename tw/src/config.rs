//! TripWeave configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main TripWeave configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// LLM provider configuration (interpretation + query enhancement)
    pub llm: LlmConfig,

    /// Place search provider configuration
    pub places: PlacesConfig,

    /// Weather forecast provider configuration
    pub weather: WeatherConfig,

    /// Geocoding provider configuration
    pub geocode: GeocodeConfig,

    /// Pipeline timeouts and selection policy
    pub pipeline: PipelineConfig,

    /// Storage configuration
    pub storage: StorageConfig,
}

impl Config {
    /// Validate configuration before use
    ///
    /// Fails fast on missing API key environment variables for the
    /// capabilities that are enabled. The LLM key is only required when
    /// the LLM is enabled - the pipeline runs heuristically without it.
    pub fn validate(&self) -> Result<()> {
        if self.llm.enabled && std::env::var(&self.llm.api_key_env).is_err() {
            return Err(eyre::eyre!(
                "LLM enabled but API key not found. Set the {} environment variable or disable llm in config.",
                self.llm.api_key_env
            ));
        }
        if std::env::var(&self.places.api_key_env).is_err() {
            return Err(eyre::eyre!(
                "Place search API key not found. Set the {} environment variable.",
                self.places.api_key_env
            ));
        }
        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .tripweave.yml
        let local_config = PathBuf::from(".tripweave.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/tripweave/tripweave.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("tripweave").join("tripweave.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Whether the LLM capability is used at all
    pub enabled: bool,

    /// Provider name (currently only "anthropic" supported)
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Environment variable containing the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Maximum tokens per response
    #[serde(rename = "max-tokens")]
    pub max_tokens: u32,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            provider: "anthropic".to_string(),
            model: "claude-sonnet-4-20250514".to_string(),
            api_key_env: "ANTHROPIC_API_KEY".to_string(),
            base_url: "https://api.anthropic.com".to_string(),
            max_tokens: 4096,
            timeout_ms: 30_000,
        }
    }
}

/// Place search provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacesConfig {
    /// Environment variable containing the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,

    /// Search radius for named sub-areas, in meters
    #[serde(rename = "area-radius-m")]
    pub area_radius_m: u32,

    /// City-wide search radius for unresolved locations, in meters
    #[serde(rename = "city-radius-m")]
    pub city_radius_m: u32,
}

impl Default for PlacesConfig {
    fn default() -> Self {
        Self {
            api_key_env: "PLACES_API_KEY".to_string(),
            base_url: "https://maps.googleapis.com".to_string(),
            timeout_ms: 10_000,
            area_radius_m: 1_500,
            city_radius_m: 5_000,
        }
    }
}

/// Weather forecast provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// Environment variable containing the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,

    /// Forecast cache TTL in minutes
    #[serde(rename = "cache-ttl-minutes")]
    pub cache_ttl_minutes: u64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key_env: "WEATHER_API_KEY".to_string(),
            base_url: "https://api.openweathermap.org".to_string(),
            timeout_ms: 5_000,
            cache_ttl_minutes: 30,
        }
    }
}

/// Geocoding provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocodeConfig {
    /// Environment variable containing the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for GeocodeConfig {
    fn default() -> Self {
        Self {
            api_key_env: "PLACES_API_KEY".to_string(),
            base_url: "https://maps.googleapis.com".to_string(),
            timeout_ms: 5_000,
        }
    }
}

/// Pipeline timeouts and selection policy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Per-block venue resolution timeout in milliseconds
    #[serde(rename = "venue-timeout-ms")]
    pub venue_timeout_ms: u64,

    /// Request-level deadline in milliseconds
    #[serde(rename = "request-timeout-ms")]
    pub request_timeout_ms: u64,

    /// Default minimum venue rating
    #[serde(rename = "min-rating")]
    pub min_rating: f64,

    /// Maximum alternatives kept per stop
    #[serde(rename = "max-alternatives")]
    pub max_alternatives: usize,

    /// Default travel duration when no estimate is possible, in minutes
    #[serde(rename = "default-travel-min")]
    pub default_travel_min: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            venue_timeout_ms: 15_000,
            request_timeout_ms: 60_000,
            min_rating: crate::domain::DEFAULT_MIN_RATING,
            max_alternatives: 3,
            default_travel_min: 15,
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory for itinerary records
    #[serde(rename = "data-dir")]
    pub data_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        // Use XDG data directory (~/.local/share/tripweave on Linux)
        let data_dir = dirs::data_dir()
            .map(|d| d.join("tripweave"))
            .unwrap_or_else(|| PathBuf::from(".tripweave"))
            .to_string_lossy()
            .into_owned();

        Self { data_dir }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.llm.provider, "anthropic");
        assert!(config.llm.enabled);
        assert_eq!(config.weather.cache_ttl_minutes, 30);
        assert_eq!(config.pipeline.min_rating, 4.0);
        assert_eq!(config.pipeline.max_alternatives, 3);
    }

    #[test]
    fn test_deserialize_config() {
        let yaml = r#"
llm:
  enabled: false
  model: claude-haiku

places:
  api-key-env: MY_PLACES_KEY
  area-radius-m: 1000

pipeline:
  venue-timeout-ms: 5000
  min-rating: 3.5
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert!(!config.llm.enabled);
        assert_eq!(config.llm.model, "claude-haiku");
        assert_eq!(config.places.api_key_env, "MY_PLACES_KEY");
        assert_eq!(config.places.area_radius_m, 1000);
        assert_eq!(config.pipeline.venue_timeout_ms, 5000);
        assert_eq!(config.pipeline.min_rating, 3.5);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let yaml = r#"
weather:
  cache-ttl-minutes: 10
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.weather.cache_ttl_minutes, 10);
        // Defaults for unspecified
        assert_eq!(config.llm.provider, "anthropic");
        assert_eq!(config.pipeline.default_travel_min, 15);
    }
}
