//! Weather forecast capability with a TTL cache
//!
//! Forecasts are advisory only: any failure is treated as "suitable
//! weather" upstream. [`CachedWeather`] fronts the real client with a
//! mutex-guarded map keyed by coordinates rounded to ~1km, the only
//! shared mutable state in the pipeline.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::config::WeatherConfig;

/// Errors from the weather capability
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Coarse weather condition buckets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeatherCondition {
    Clear,
    Clouds,
    Rain,
    Drizzle,
    Thunderstorm,
    Snow,
    Fog,
    Other,
}

impl WeatherCondition {
    /// Parse a provider condition string ("Rain", "Thunderstorm", ...)
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "clear" => Self::Clear,
            "clouds" => Self::Clouds,
            "rain" => Self::Rain,
            "drizzle" => Self::Drizzle,
            "thunderstorm" => Self::Thunderstorm,
            "snow" => Self::Snow,
            "mist" | "fog" | "haze" => Self::Fog,
            _ => Self::Other,
        }
    }

    /// Whether this condition rules out outdoor activities
    pub fn is_precipitation(&self) -> bool {
        matches!(self, Self::Rain | Self::Drizzle | Self::Thunderstorm | Self::Snow)
    }
}

/// One forecast point
#[derive(Debug, Clone)]
pub struct ForecastEntry {
    pub time: DateTime<Utc>,
    pub condition: WeatherCondition,
    pub temp_c: f64,
}

/// Weather forecast capability contract
#[async_trait]
pub trait WeatherForecast: Send + Sync {
    /// Hourly-ish forecast entries for a coordinate
    async fn forecast(&self, lat: f64, lng: f64) -> Result<Vec<ForecastEntry>, WeatherError>;
}

/// HTTP implementation against an OpenWeather-style forecast API
pub struct HttpWeatherClient {
    base_url: String,
    api_key: String,
    http: reqwest::Client,
}

impl HttpWeatherClient {
    /// Create a client from configuration
    pub fn from_config(config: &WeatherConfig) -> Result<Self, WeatherError> {
        debug!(base_url = %config.base_url, "HttpWeatherClient::from_config: called");
        let api_key = std::env::var(&config.api_key_env)
            .map_err(|_| WeatherError::InvalidResponse(format!("Missing env var: {}", config.api_key_env)))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(WeatherError::Network)?;

        Ok(Self {
            base_url: config.base_url.clone(),
            api_key,
            http,
        })
    }
}

#[async_trait]
impl WeatherForecast for HttpWeatherClient {
    async fn forecast(&self, lat: f64, lng: f64) -> Result<Vec<ForecastEntry>, WeatherError> {
        debug!(lat, lng, "forecast: called");
        let url = format!("{}/data/2.5/forecast", self.base_url);

        let response = self
            .http
            .get(&url)
            .query(&[
                ("lat", lat.to_string()),
                ("lon", lng.to_string()),
                ("units", "metric".to_string()),
                ("appid", self.api_key.clone()),
            ])
            .send()
            .await?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(WeatherError::Api { status, message });
        }

        let body: ForecastResponse = response
            .json()
            .await
            .map_err(|e| WeatherError::InvalidResponse(e.to_string()))?;

        let entries = body
            .list
            .into_iter()
            .filter_map(|item| {
                let time = DateTime::from_timestamp(item.dt, 0)?;
                let condition = item
                    .weather
                    .first()
                    .map(|w| WeatherCondition::parse(&w.main))
                    .unwrap_or(WeatherCondition::Other);
                Some(ForecastEntry {
                    time,
                    condition,
                    temp_c: item.main.temp,
                })
            })
            .collect();

        Ok(entries)
    }
}

/// Round a coordinate to 0.01 degrees (~1km) for cache keying
fn cache_key(lat: f64, lng: f64) -> (i64, i64) {
    ((lat * 100.0).round() as i64, (lng * 100.0).round() as i64)
}

struct CacheSlot {
    fetched_at: Instant,
    entries: Vec<ForecastEntry>,
}

/// TTL-caching front for a [`WeatherForecast`]
///
/// Stale reads within the TTL window are acceptable; writes are
/// last-write-wins.
pub struct CachedWeather {
    inner: Arc<dyn WeatherForecast>,
    ttl: Duration,
    cache: Mutex<HashMap<(i64, i64), CacheSlot>>,
}

impl CachedWeather {
    pub fn new(inner: Arc<dyn WeatherForecast>, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            cache: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl WeatherForecast for CachedWeather {
    async fn forecast(&self, lat: f64, lng: f64) -> Result<Vec<ForecastEntry>, WeatherError> {
        let key = cache_key(lat, lng);

        {
            let cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(slot) = cache.get(&key)
                && slot.fetched_at.elapsed() < self.ttl
            {
                debug!(?key, "forecast: cache hit");
                return Ok(slot.entries.clone());
            }
        }

        // Fetch outside the lock; concurrent misses may race, last write wins
        let entries = self.inner.forecast(lat, lng).await?;

        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        cache.insert(
            key,
            CacheSlot {
                fetched_at: Instant::now(),
                entries: entries.clone(),
            },
        );
        debug!(?key, count = entries.len(), "forecast: cached");
        Ok(entries)
    }
}


// Provider response types

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    #[serde(default)]
    list: Vec<ForecastItem>,
}

#[derive(Debug, Deserialize)]
struct ForecastItem {
    dt: i64,
    main: ForecastMain,
    #[serde(default)]
    weather: Vec<ForecastWeather>,
}

#[derive(Debug, Deserialize)]
struct ForecastMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct ForecastWeather {
    main: String,
}

#[cfg(test)]
mod tests {
    use super::mock::MockWeather;
    use super::*;
    use std::sync::atomic::Ordering;

    fn entry(temp_c: f64, condition: WeatherCondition) -> ForecastEntry {
        ForecastEntry {
            time: Utc::now(),
            condition,
            temp_c,
        }
    }

    #[test]
    fn test_condition_parse_buckets() {
        assert_eq!(WeatherCondition::parse("Rain"), WeatherCondition::Rain);
        assert_eq!(WeatherCondition::parse("Thunderstorm"), WeatherCondition::Thunderstorm);
        assert_eq!(WeatherCondition::parse("Haze"), WeatherCondition::Fog);
        assert_eq!(WeatherCondition::parse("Sandstorm"), WeatherCondition::Other);
        assert!(WeatherCondition::Snow.is_precipitation());
        assert!(!WeatherCondition::Clouds.is_precipitation());
    }

    #[test]
    fn test_cache_key_rounds_to_same_cell() {
        assert_eq!(cache_key(40.7211, -74.0034), cache_key(40.7189, -73.9988));
        assert_ne!(cache_key(40.72, -74.0), cache_key(40.80, -74.0));
    }

    #[tokio::test]
    async fn test_cached_weather_hits_within_ttl() {
        let inner = Arc::new(MockWeather::new(vec![entry(20.0, WeatherCondition::Clear)]));
        let cached = CachedWeather::new(inner.clone(), Duration::from_secs(1800));

        let first = cached.forecast(40.7211, -74.0034).await.unwrap();
        // Slightly different coords in the same ~1km cell
        let second = cached.forecast(40.7189, -73.9988).await.unwrap();

        assert_eq!(first.len(), second.len());
        assert_eq!(inner.call_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cached_weather_expires() {
        let inner = Arc::new(MockWeather::new(vec![entry(20.0, WeatherCondition::Clear)]));
        let cached = CachedWeather::new(inner.clone(), Duration::from_millis(0));

        cached.forecast(40.72, -74.0).await.unwrap();
        cached.forecast(40.72, -74.0).await.unwrap();
        assert_eq!(inner.call_count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_cached_weather_propagates_errors_uncached() {
        let inner = Arc::new(MockWeather::failing());
        let cached = CachedWeather::new(inner.clone(), Duration::from_secs(1800));

        assert!(cached.forecast(40.72, -74.0).await.is_err());
        assert!(cached.forecast(40.72, -74.0).await.is_err());
        // Failures are not cached
        assert_eq!(inner.call_count.load(Ordering::SeqCst), 2);
    }
}
