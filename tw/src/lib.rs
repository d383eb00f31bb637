//! TripWeave - free-text day plans into verified itineraries
//!
//! TripWeave turns a request like "coffee in Soho at 10am, then lunch near
//! the river" into a time-ordered sequence of real venues connected by
//! travel segments. The pipeline is built to stay useful when any single
//! external service is degraded: every stage has a deterministic fallback.
//!
//! # Pipeline
//!
//! ```text
//! query → Interpreter (AI → heuristic) → Deduplicator → TimeBlocks
//!       → VenueResolver (tiered search, per block, concurrent)
//!       → TravelStitcher → Itinerary → planstore
//! ```
//!
//! # Modules
//!
//! - [`interpret`] - AI-assisted and heuristic query interpretation
//! - [`dedupe`] - merge raw intents into canonical TimeBlocks
//! - [`timeparse`] - vague time phrases into canonical local times
//! - [`location`] - gazetteer + geocoder location normalization
//! - [`venue`] - tiered venue search with quality/weather/hours policies
//! - [`travel`] - inter-venue travel estimates
//! - [`pipeline`] - end-to-end planner and itinerary assembly
//! - [`capability`] - external service contracts (places, weather, geocode)
//! - [`llm`] - LLM client trait and Anthropic implementation

pub mod capability;
pub mod cli;
pub mod config;
pub mod dedupe;
pub mod domain;
pub mod error;
pub mod interpret;
pub mod llm;
pub mod location;
pub mod pipeline;
pub mod timeparse;
pub mod travel;
pub mod venue;

// Re-export commonly used types
pub use config::{Config, LlmConfig, PipelineConfig, PlacesConfig, WeatherConfig};
pub use domain::{
    ActivityCategory, IntentSource, Itinerary, ItineraryStop, NormalizedTime, PlanRequest, RawIntent, ResolvedVenue,
    TimeBlock, TravelSegment, UnresolvedBlock,
};
pub use error::PlanError;
pub use pipeline::Planner;
