//! RawIntent - transient output of query interpretation

use serde::{Deserialize, Serialize};

/// Where an intent came from in the interpretation output
///
/// Fixed-time intents carry an explicit user-stated time; flexible ones
/// are activities the pipeline schedules itself. Fixed entries win when
/// deduplication finds both for the same location and activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentSource {
    Fixed,
    Flexible,
}

/// One interpreted activity before normalization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawIntent {
    /// Location phrase as the user stated it ("Soho", "near the river")
    pub location: Option<String>,

    /// Activity description ("coffee", "lunch", "museum visit")
    pub activity: String,

    /// Explicit time phrase if one was stated ("10am", "around noon")
    pub time_text: Option<String>,

    /// Venue preference hint ("somewhere quiet", "rooftop")
    pub venue_preference: Option<String>,

    /// Extra search keywords from the interpretation
    pub keywords: Vec<String>,

    /// Fixed (explicit time) or flexible (to be scheduled)
    pub source: IntentSource,
}

impl RawIntent {
    /// Create a flexible intent with just an activity
    pub fn flexible(activity: impl Into<String>) -> Self {
        Self {
            location: None,
            activity: activity.into(),
            time_text: None,
            venue_preference: None,
            keywords: Vec::new(),
            source: IntentSource::Flexible,
        }
    }

    /// Create a fixed intent with an activity and explicit time
    pub fn fixed(activity: impl Into<String>, time_text: impl Into<String>) -> Self {
        Self {
            location: None,
            activity: activity.into(),
            time_text: Some(time_text.into()),
            venue_preference: None,
            keywords: Vec::new(),
            source: IntentSource::Fixed,
        }
    }
}
