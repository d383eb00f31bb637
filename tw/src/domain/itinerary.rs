//! Itinerary - the final persisted planning result

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::venue::{ResolvedVenue, TravelSegment};

/// A resolved stop: the primary venue plus ranked alternatives
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItineraryStop {
    /// Activity description from the originating block
    pub activity: String,

    /// Scheduled time, human-readable ("10:00 AM")
    pub time: String,

    /// The selected venue
    pub primary: ResolvedVenue,

    /// Up to 3 runners-up, sorted by rating descending
    pub alternatives: Vec<ResolvedVenue>,
}

/// A TimeBlock the resolver could not fill, recorded rather than dropped
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnresolvedBlock {
    /// Activity description from the block
    pub activity: String,

    /// Location name from the block
    pub location: String,

    /// Why resolution failed ("no venues found", "timed out")
    pub reason: String,
}

/// The assembled plan: ordered stops connected by travel segments
///
/// Immutable after creation; persisted until explicitly deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Itinerary {
    /// Stable identifier (UUIDv7, time-ordered)
    pub id: String,

    /// Original query text
    pub query: String,

    /// Target city identifier
    pub city: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Resolved stops in time order
    pub stops: Vec<ItineraryStop>,

    /// Travel segments; `travel[i]` connects stop i to stop i+1
    pub travel: Vec<TravelSegment>,

    /// Blocks that could not be resolved
    pub unresolved: Vec<UnresolvedBlock>,
}

impl Itinerary {
    /// Create a new itinerary with a generated id
    pub fn new(
        query: impl Into<String>,
        city: impl Into<String>,
        stops: Vec<ItineraryStop>,
        travel: Vec<TravelSegment>,
        unresolved: Vec<UnresolvedBlock>,
    ) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            query: query.into(),
            city: city.into(),
            created_at: Utc::now(),
            stops,
            travel,
            unresolved,
        }
    }
}

impl planstore::Record for Itinerary {
    fn id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_itinerary_has_unique_ids() {
        let a = Itinerary::new("q", "nyc", vec![], vec![], vec![]);
        let b = Itinerary::new("q", "nyc", vec![], vec![], vec![]);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_itinerary_serde_roundtrip() {
        let it = Itinerary::new("coffee in soho", "nyc", vec![], vec![], vec![]);
        let json = serde_json::to_string(&it).unwrap();
        let back: Itinerary = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, it.id);
        assert_eq!(back.query, "coffee in soho");
    }
}
