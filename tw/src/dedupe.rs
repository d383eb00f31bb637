//! ActivityDeduplicator - raw intents into canonical TimeBlocks
//!
//! The AI strategy commonly emits the same real-world activity in both
//! its fixed and flexible candidate lists. Deduplication keys each
//! intent by (normalized location, activity category) and keeps the
//! first write: fixed-sourced intents are processed before flexible
//! ones, so explicit times take precedence over inferred ones.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{debug, info};

use crate::domain::{ActivityCategory, IntentSource, PlanRequest, RawIntent, TimeBlock};
use crate::location::{CityContext, LocationResolver, ResolvedLocation};
use crate::timeparse;

/// Classify an activity description into a category by keyword rules
pub fn classify_activity(text: &str) -> ActivityCategory {
    let lower = text.to_lowercase();
    let has = |words: &[&str]| {
        words.iter().any(|w| {
            lower
                .split(|c: char| !c.is_alphanumeric())
                .any(|token| token == *w)
        })
    };

    if has(&["museum", "gallery", "exhibit", "exhibition"]) {
        ActivityCategory::Museum
    } else if has(&["breakfast", "brunch", "lunch", "dinner", "eat", "food", "restaurant", "meal"]) {
        ActivityCategory::Restaurant
    } else if has(&["coffee", "cafe", "espresso", "latte"]) {
        ActivityCategory::Cafe
    } else if has(&["park", "garden", "picnic", "outdoor", "outdoors"]) {
        ActivityCategory::Park
    } else if has(&["shop", "shopping", "store", "boutique", "market"]) {
        ActivityCategory::Shopping
    } else if has(&["bar", "drink", "drinks", "pub", "cocktail", "cocktails"]) {
        ActivityCategory::Bar
    } else {
        ActivityCategory::Attraction
    }
}

/// Merges raw intents into a canonical, time-sorted TimeBlock list
pub struct ActivityDeduplicator {
    location: Arc<LocationResolver>,
    min_rating: f64,
}

impl ActivityDeduplicator {
    pub fn new(location: Arc<LocationResolver>, min_rating: f64) -> Self {
        Self { location, min_rating }
    }

    /// Deduplicate intents into sorted TimeBlocks
    ///
    /// Guarantees at least one block: an empty result synthesizes a
    /// generic exploration block at the request's start time.
    pub async fn dedupe(&self, intents: Vec<RawIntent>, request: &PlanRequest, city: &CityContext) -> Vec<TimeBlock> {
        debug!(count = intents.len(), "dedupe: called");
        let date = request.date.unwrap_or_else(|| Utc::now().date_naive());

        // Fixed-sourced intents first so their times win on key collisions
        let (fixed, flexible): (Vec<_>, Vec<_>) = intents.into_iter().partition(|i| i.source == IntentSource::Fixed);

        let mut seen: HashSet<String> = HashSet::new();
        let mut blocks: Vec<TimeBlock> = Vec::new();

        for intent in fixed.into_iter().chain(flexible) {
            let block = self.build_block(intent, request, city, date).await;
            let key = block.dedupe_key();
            if seen.insert(key.clone()) {
                blocks.push(block);
            } else {
                debug!(%key, "dedupe: dropping duplicate intent");
            }
        }

        if blocks.is_empty() {
            info!("dedupe: no blocks, synthesizing generic exploration block");
            blocks.push(self.generic_block(request, city, date));
        }

        // Stable sort: insertion order breaks instant ties
        blocks.sort_by_key(|b| b.time.instant);
        debug!(count = blocks.len(), "dedupe: produced blocks");
        blocks
    }

    async fn build_block(
        &self,
        intent: RawIntent,
        request: &PlanRequest,
        city: &CityContext,
        date: NaiveDate,
    ) -> TimeBlock {
        let time_text = intent
            .time_text
            .or_else(|| request.start_time.clone())
            .unwrap_or_default();
        let time = timeparse::normalize(&time_text, date, city.timezone);

        let location = match &intent.location {
            Some(phrase) => self.location.resolve(phrase, city).await,
            None => ResolvedLocation::city_center(city),
        };

        TimeBlock {
            location,
            time,
            category: classify_activity(&intent.activity),
            search_term: intent.activity,
            venue_preference: intent.venue_preference,
            keywords: intent.keywords,
            min_rating: self.min_rating,
        }
    }

    fn generic_block(&self, request: &PlanRequest, city: &CityContext, date: NaiveDate) -> TimeBlock {
        let time_text = request.start_time.clone().unwrap_or_default();
        TimeBlock {
            location: ResolvedLocation::city_center(city),
            time: timeparse::normalize(&time_text, date, city.timezone),
            category: ActivityCategory::Generic,
            search_term: "explore the area".to_string(),
            venue_preference: None,
            keywords: Vec::new(),
            min_rating: self.min_rating,
        }
    }
}
