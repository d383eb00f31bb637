//! Top-level planning errors
//!
//! Most failures inside the pipeline degrade instead of propagating:
//! interpretation falls back to heuristics, unresolvable venues become
//! flagged gaps, weather and geocoding errors get safe defaults. What
//! remains here is the short list of conditions that genuinely stop a
//! plan.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlanError {
    /// Request named a city the gazetteer does not know
    #[error("Unknown city '{0}'; run `tw cities` for supported cities")]
    UnknownCity(String),

    /// Interpretation and synthesis produced zero time blocks
    #[error("Could not derive any activities from the query")]
    NoBlocks,

    /// Persisting or loading an itinerary failed
    #[error("Storage error: {0}")]
    Store(#[from] planstore::StoreError),
}
