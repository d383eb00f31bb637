//! Place search capability
//!
//! Text search plus per-place details backfill against a
//! Google-Places-style JSON API. The base URL is configurable so tests
//! and alternative providers can point elsewhere.

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Timelike, Utc};
use chrono_tz::Tz;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::config::PlacesConfig;

/// Errors from the place search capability
#[derive(Debug, Error)]
pub enum PlacesError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// One open interval in a weekly schedule, minutes since local midnight
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OpenPeriod {
    /// Day of week, 0 = Sunday
    pub day: u8,
    /// Opening minute of day
    pub open_min: u16,
    /// Closing minute of day; at or below `open_min` wraps past midnight
    pub close_min: u16,
}

/// A venue candidate returned by the search capability
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceCandidate {
    pub place_id: String,
    pub name: String,
    pub address: String,
    pub lat: f64,
    pub lng: f64,
    pub rating: Option<f64>,
    pub price_level: Option<u8>,
    pub types: Vec<String>,
    /// Weekly opening periods; None when hours are unknown
    pub open_periods: Option<Vec<OpenPeriod>>,
}

impl PlaceCandidate {
    /// Whether this place is open at the given instant in the given zone
    ///
    /// Returns None when hours are unknown - callers must not treat
    /// unknown as closed.
    pub fn is_open_at(&self, instant: DateTime<Utc>, tz: Tz) -> Option<bool> {
        let periods = self.open_periods.as_ref()?;
        if periods.is_empty() {
            return None;
        }

        let local = instant.with_timezone(&tz);
        let day = local.weekday().num_days_from_sunday() as u8;
        let minute = (local.hour() * 60 + local.minute()) as u16;
        let prev_day = (day + 6) % 7;

        let open = periods.iter().any(|p| {
            if p.close_min > p.open_min {
                p.day == day && minute >= p.open_min && minute < p.close_min
            } else {
                // Overnight period: covers [open..midnight) on p.day and
                // [midnight..close) on the following day
                (p.day == day && minute >= p.open_min) || (p.day == prev_day && minute < p.close_min)
            }
        });
        Some(open)
    }
}

/// Place search capability contract
#[async_trait]
pub trait PlaceSearch: Send + Sync {
    /// Text search with optional location bias and radius in meters
    async fn search(
        &self,
        query: &str,
        bias: Option<(f64, f64)>,
        radius_m: Option<u32>,
    ) -> Result<Vec<PlaceCandidate>, PlacesError>;

    /// Fetch full details (rating/hours backfill) for one place
    async fn get_details(&self, place_id: &str) -> Result<PlaceCandidate, PlacesError>;
}

/// HTTP implementation against a Google-Places-style API
pub struct HttpPlacesClient {
    base_url: String,
    api_key: String,
    http: reqwest::Client,
}

impl HttpPlacesClient {
    /// Create a client from configuration
    ///
    /// Reads the API key from the environment variable named in config.
    pub fn from_config(config: &PlacesConfig) -> Result<Self, PlacesError> {
        debug!(base_url = %config.base_url, "HttpPlacesClient::from_config: called");
        let api_key = std::env::var(&config.api_key_env)
            .map_err(|_| PlacesError::InvalidResponse(format!("Missing env var: {}", config.api_key_env)))?;

        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(PlacesError::Network)?;

        Ok(Self {
            base_url: config.base_url.clone(),
            api_key,
            http,
        })
    }

    fn parse_candidate(&self, raw: RawPlace) -> PlaceCandidate {
        let open_periods = raw.opening_hours.and_then(|h| h.periods).map(parse_periods);

        PlaceCandidate {
            place_id: raw.place_id,
            name: raw.name,
            address: raw.formatted_address.unwrap_or_default(),
            lat: raw.geometry.location.lat,
            lng: raw.geometry.location.lng,
            rating: raw.rating,
            price_level: raw.price_level,
            types: raw.types.unwrap_or_default(),
            open_periods,
        }
    }
}

/// Convert raw provider periods into weekly open intervals
///
/// A period with an open time but no close is the provider's
/// open-24-hours signal; it expands to a full-day interval on every day
/// of the week so `is_open_at` reports open at any instant.
fn parse_periods(periods: Vec<RawPeriod>) -> Vec<OpenPeriod> {
    let mut parsed = Vec::new();
    for p in periods {
        let Some(open) = p.open else { continue };
        let Some(open_min) = parse_hhmm(&open.time) else { continue };
        match p.close {
            Some(c) => {
                let Some(close_min) = parse_hhmm(&c.time) else { continue };
                parsed.push(OpenPeriod {
                    day: open.day,
                    open_min,
                    close_min,
                });
            }
            None => {
                for day in 0..7 {
                    parsed.push(OpenPeriod {
                        day,
                        open_min: 0,
                        close_min: 0,
                    });
                }
            }
        }
    }
    parsed
}

/// Parse "HHMM" into minutes since midnight
fn parse_hhmm(s: &str) -> Option<u16> {
    if s.len() != 4 {
        return None;
    }
    let hour: u16 = s[..2].parse().ok()?;
    let minute: u16 = s[2..].parse().ok()?;
    if hour > 23 || minute > 59 {
        return None;
    }
    Some(hour * 60 + minute)
}

#[async_trait]
impl PlaceSearch for HttpPlacesClient {
    async fn search(
        &self,
        query: &str,
        bias: Option<(f64, f64)>,
        radius_m: Option<u32>,
    ) -> Result<Vec<PlaceCandidate>, PlacesError> {
        debug!(%query, ?bias, ?radius_m, "search: called");
        let url = format!("{}/maps/api/place/textsearch/json", self.base_url);

        let mut request = self.http.get(&url).query(&[("query", query), ("key", &self.api_key)]);
        if let Some((lat, lng)) = bias {
            request = request.query(&[("location", format!("{lat},{lng}"))]);
        }
        if let Some(radius) = radius_m {
            request = request.query(&[("radius", radius.to_string())]);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        if !response.status().is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PlacesError::Api { status, message });
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| PlacesError::InvalidResponse(e.to_string()))?;

        if let Some(s) = &body.status
            && s != "OK"
            && s != "ZERO_RESULTS"
        {
            return Err(PlacesError::Api {
                status,
                message: s.clone(),
            });
        }

        let candidates: Vec<PlaceCandidate> = body.results.into_iter().map(|r| self.parse_candidate(r)).collect();
        debug!(count = candidates.len(), "search: parsed candidates");
        Ok(candidates)
    }

    async fn get_details(&self, place_id: &str) -> Result<PlaceCandidate, PlacesError> {
        debug!(%place_id, "get_details: called");
        let url = format!("{}/maps/api/place/details/json", self.base_url);

        let response = self
            .http
            .get(&url)
            .query(&[("place_id", place_id), ("key", &self.api_key)])
            .send()
            .await?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PlacesError::Api { status, message });
        }

        let body: DetailsResponse = response
            .json()
            .await
            .map_err(|e| PlacesError::InvalidResponse(e.to_string()))?;

        let raw = body
            .result
            .ok_or_else(|| PlacesError::InvalidResponse(format!("No details for place {place_id}")))?;
        Ok(self.parse_candidate(raw))
    }
}

// Provider response types

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<RawPlace>,
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    result: Option<RawPlace>,
}

#[derive(Debug, Deserialize)]
struct RawPlace {
    place_id: String,
    name: String,
    formatted_address: Option<String>,
    geometry: RawGeometry,
    rating: Option<f64>,
    price_level: Option<u8>,
    types: Option<Vec<String>>,
    opening_hours: Option<RawHours>,
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

#[derive(Debug, Deserialize)]
struct RawHours {
    periods: Option<Vec<RawPeriod>>,
}

#[derive(Debug, Deserialize)]
struct RawPeriod {
    open: Option<RawDayTime>,
    close: Option<RawDayTime>,
}

#[derive(Debug, Deserialize)]
struct RawDayTime {
    day: u8,
    time: String,
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::Mutex;

    /// Mock place search returning queued responses in call order
    pub struct MockPlaceSearch {
        responses: Mutex<Vec<Result<Vec<PlaceCandidate>, PlacesError>>>,
        pub queries: Mutex<Vec<String>>,
    }

    impl MockPlaceSearch {
        pub fn new(responses: Vec<Result<Vec<PlaceCandidate>, PlacesError>>) -> Self {
            Self {
                responses: Mutex::new(responses),
                queries: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl PlaceSearch for MockPlaceSearch {
        async fn search(
            &self,
            query: &str,
            _bias: Option<(f64, f64)>,
            _radius_m: Option<u32>,
        ) -> Result<Vec<PlaceCandidate>, PlacesError> {
            self.queries.lock().unwrap().push(query.to_string());
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                return Ok(Vec::new());
            }
            responses.remove(0)
        }

        async fn get_details(&self, place_id: &str) -> Result<PlaceCandidate, PlacesError> {
            Err(PlacesError::InvalidResponse(format!("no details for {place_id}")))
        }
    }

    /// Convenience candidate builder for tests
    pub fn candidate(id: &str, name: &str, address: &str, rating: f64, types: &[&str]) -> PlaceCandidate {
        PlaceCandidate {
            place_id: id.to_string(),
            name: name.to_string(),
            address: address.to_string(),
            lat: 40.72,
            lng: -74.0,
            rating: Some(rating),
            price_level: Some(2),
            types: types.iter().map(|t| t.to_string()).collect(),
            open_periods: None,
        }
    }
}
