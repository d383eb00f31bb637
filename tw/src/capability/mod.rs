//! External capability contracts
//!
//! Every external service the pipeline touches is modeled as an
//! object-safe async trait so degraded or absent services can be
//! swapped for fallbacks (and mocked in tests):
//!
//! - [`PlaceSearch`] - venue text search + details backfill
//! - [`WeatherForecast`] - hourly forecasts, fronted by [`CachedWeather`]
//! - [`Geocoder`] - free-text location verification
//!
//! The LLM capability lives in [`crate::llm`] since it has its own
//! provider machinery.

pub mod geocode;
pub mod places;
pub mod weather;

pub use geocode::{GeocodeError, GeocodeResult, Geocoder, HttpGeocoder};
pub use places::{HttpPlacesClient, OpenPeriod, PlaceCandidate, PlaceSearch, PlacesError};
pub use weather::{CachedWeather, ForecastEntry, HttpWeatherClient, WeatherCondition, WeatherError, WeatherForecast};
