//! TimeBlock - a canonical (location, time, activity) planning unit

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::location::ResolvedLocation;

/// Default minimum venue rating when a block does not override it
pub const DEFAULT_MIN_RATING: f64 = 4.0;

/// Fixed set of activity categories the resolver knows how to search for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityCategory {
    Restaurant,
    Cafe,
    Museum,
    Park,
    Bar,
    Shopping,
    Attraction,
    Generic,
}

impl ActivityCategory {
    /// Base search keyword used by the broadened (tier 1) query
    pub fn search_keyword(&self) -> &'static str {
        match self {
            Self::Restaurant => "restaurant",
            Self::Cafe => "cafe",
            Self::Museum => "museum",
            Self::Park => "park",
            Self::Bar => "bar",
            Self::Shopping => "shopping",
            Self::Attraction => "tourist attraction",
            Self::Generic => "things to do",
        }
    }
}

impl std::fmt::Display for ActivityCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Restaurant => write!(f, "restaurant"),
            Self::Cafe => write!(f, "cafe"),
            Self::Museum => write!(f, "museum"),
            Self::Park => write!(f, "park"),
            Self::Bar => write!(f, "bar"),
            Self::Shopping => write!(f, "shopping"),
            Self::Attraction => write!(f, "attraction"),
            Self::Generic => write!(f, "generic"),
        }
    }
}

/// A time phrase normalized into the target city's local clock
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedTime {
    /// 24-hour "HH:MM" canonical form
    pub canonical: String,

    /// The same local time as a UTC instant (DST-correct)
    pub instant: DateTime<Utc>,

    /// Localized display string, e.g. "3:00 PM"
    pub display: String,
}

/// A deduplicated, time-anchored activity ready for venue resolution
///
/// Invariants (maintained by the deduplicator): a request's blocks are
/// sorted ascending by `time.instant`, and no two blocks share the same
/// (lowercased location name, category) key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeBlock {
    /// Normalized location for the activity
    pub location: ResolvedLocation,

    /// Canonical local time
    pub time: NormalizedTime,

    /// Activity category used for search and filtering
    pub category: ActivityCategory,

    /// Free-text search term (the original activity description)
    pub search_term: String,

    /// Venue preference hint carried through from interpretation
    pub venue_preference: Option<String>,

    /// Extra search keywords
    pub keywords: Vec<String>,

    /// Minimum acceptable venue rating
    pub min_rating: f64,
}

impl TimeBlock {
    /// Deduplication key: lowercased location name + category
    pub fn dedupe_key(&self) -> String {
        format!("{}|{}", self.location.name.to_lowercase(), self.category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_display_roundtrip() {
        assert_eq!(ActivityCategory::Cafe.to_string(), "cafe");
        assert_eq!(ActivityCategory::Attraction.to_string(), "attraction");
        assert_eq!(ActivityCategory::Generic.search_keyword(), "things to do");
    }

    #[test]
    fn test_category_serde_snake_case() {
        let json = serde_json::to_string(&ActivityCategory::Restaurant).unwrap();
        assert_eq!(json, "\"restaurant\"");
    }
}
