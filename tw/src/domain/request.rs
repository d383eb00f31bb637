//! PlanRequest - the immutable planning input

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single planning request: free text plus optional scheduling hints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanRequest {
    /// Raw user query, e.g. "coffee in Soho at 10am, then lunch"
    pub query: String,

    /// Date the plan is for; defaults to today when absent
    pub date: Option<NaiveDate>,

    /// Preferred start time as "HH:MM" or a phrase ("morning")
    pub start_time: Option<String>,

    /// Target city identifier (gazetteer key, e.g. "nyc")
    pub city: String,
}

impl PlanRequest {
    /// Create a request with just query and city
    pub fn new(query: impl Into<String>, city: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            date: None,
            start_time: None,
            city: city.into(),
        }
    }
}
