//! Location normalization
//!
//! Free-text place references are matched against a curated gazetteer of
//! named areas first; only unknown phrases go to the external geocoder.
//! Nothing here is fatal: an unmatchable phrase passes through unchanged
//! with nearby gazetteer names attached as suggestions.

pub mod gazetteer;
pub mod resolver;

pub use gazetteer::{Area, CityContext, city, city_ids};
pub use resolver::{LocationResolver, levenshtein};

use serde::{Deserialize, Serialize};

/// How a location phrase was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationKind {
    /// Matched a curated gazetteer area
    Area,
    /// Verified by the external geocoder
    Geocoded,
    /// No confident match; original phrase kept
    Unresolved,
}

/// A normalized location reference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedLocation {
    /// Canonical name (or the original phrase when unresolved)
    pub name: String,

    /// Coordinates when known
    pub coords: Option<(f64, f64)>,

    /// How this location was resolved
    pub kind: LocationKind,

    /// Near-match suggestions for caller-level error messages
    pub suggestions: Vec<String>,
}

impl ResolvedLocation {
    /// A location matched from the gazetteer
    pub fn area(name: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            name: name.into(),
            coords: Some((lat, lng)),
            kind: LocationKind::Area,
            suggestions: Vec::new(),
        }
    }

    /// The city center, used when no location phrase is available
    pub fn city_center(city: &CityContext) -> Self {
        Self {
            name: city.name.to_string(),
            coords: Some((city.center_lat, city.center_lng)),
            kind: LocationKind::Area,
            suggestions: Vec::new(),
        }
    }

    /// An unresolved phrase, passed through unchanged
    pub fn unresolved(phrase: impl Into<String>, suggestions: Vec<String>) -> Self {
        Self {
            name: phrase.into(),
            coords: None,
            kind: LocationKind::Unresolved,
            suggestions,
        }
    }
}
