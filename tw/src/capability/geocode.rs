//! Geocoding capability
//!
//! Verifies free-text location phrases the gazetteer does not know.
//! Errors here are always recoverable: callers fall back to passing the
//! phrase through unchanged.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::config::GeocodeConfig;

/// Errors from the geocoding capability
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// A verified location from the geocoder
#[derive(Debug, Clone)]
pub struct GeocodeResult {
    pub canonical_name: String,
    pub lat: f64,
    pub lng: f64,
}

/// Geocoding capability contract
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolve a phrase to a verified location, None when nothing matches
    ///
    /// `city_hint` is appended to the query to bias results.
    async fn resolve(&self, name: &str, city_hint: &str) -> Result<Option<GeocodeResult>, GeocodeError>;
}

/// HTTP implementation against a Google-geocoding-style API
pub struct HttpGeocoder {
    base_url: String,
    api_key: String,
    http: reqwest::Client,
}

impl HttpGeocoder {
    /// Create a client from configuration
    pub fn from_config(config: &GeocodeConfig) -> Result<Self, GeocodeError> {
        debug!(base_url = %config.base_url, "HttpGeocoder::from_config: called");
        let api_key = std::env::var(&config.api_key_env)
            .map_err(|_| GeocodeError::InvalidResponse(format!("Missing env var: {}", config.api_key_env)))?;

        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(GeocodeError::Network)?;

        Ok(Self {
            base_url: config.base_url.clone(),
            api_key,
            http,
        })
    }
}

#[async_trait]
impl Geocoder for HttpGeocoder {
    async fn resolve(&self, name: &str, city_hint: &str) -> Result<Option<GeocodeResult>, GeocodeError> {
        debug!(%name, %city_hint, "resolve: called");
        let url = format!("{}/maps/api/geocode/json", self.base_url);
        let address = format!("{name}, {city_hint}");

        let response = self
            .http
            .get(&url)
            .query(&[("address", address.as_str()), ("key", &self.api_key)])
            .send()
            .await?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GeocodeError::Api { status, message });
        }

        let body: GeocodeResponse = response
            .json()
            .await
            .map_err(|e| GeocodeError::InvalidResponse(e.to_string()))?;

        let Some(first) = body.results.into_iter().next() else {
            debug!(%name, "resolve: no results");
            return Ok(None);
        };

        Ok(Some(GeocodeResult {
            canonical_name: first.formatted_address,
            lat: first.geometry.location.lat,
            lng: first.geometry.location.lng,
        }))
    }
}

// Provider response types

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    results: Vec<RawGeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct RawGeocodeResult {
    formatted_address: String,
    geometry: RawGeometry,
}

#[derive(Debug, Deserialize)]
struct RawGeometry {
    location: RawLatLng,
}

#[derive(Debug, Deserialize)]
struct RawLatLng {
    lat: f64,
    lng: f64,
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;

    /// Mock geocoder backed by a fixed name -> result map
    pub struct MockGeocoder {
        results: HashMap<String, GeocodeResult>,
        pub fail: bool,
    }

    impl MockGeocoder {
        pub fn new(results: HashMap<String, GeocodeResult>) -> Self {
            Self { results, fail: false }
        }

        pub fn empty() -> Self {
            Self {
                results: HashMap::new(),
                fail: false,
            }
        }

        pub fn failing() -> Self {
            Self {
                results: HashMap::new(),
                fail: true,
            }
        }
    }

    #[async_trait]
    impl Geocoder for MockGeocoder {
        async fn resolve(&self, name: &str, _city_hint: &str) -> Result<Option<GeocodeResult>, GeocodeError> {
            if self.fail {
                return Err(GeocodeError::InvalidResponse("mock failure".to_string()));
            }
            Ok(self.results.get(&name.to_lowercase()).cloned())
        }
    }
}
