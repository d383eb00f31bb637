//! Domain types for the planning pipeline
//!
//! These are the records passed between pipeline stages: the immutable
//! input request, transient raw intents, canonical TimeBlocks, resolved
//! venues, and the final Itinerary.

mod block;
mod intent;
mod itinerary;
mod request;
mod venue;

pub use block::{ActivityCategory, DEFAULT_MIN_RATING, NormalizedTime, TimeBlock};
pub use intent::{IntentSource, RawIntent};
pub use itinerary::{Itinerary, ItineraryStop, UnresolvedBlock};
pub use request::PlanRequest;
pub use venue::{ResolvedVenue, TravelSegment, haversine_m};
