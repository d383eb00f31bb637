//! Deterministic heuristic interpretation strategy
//!
//! Zero external dependencies; the terminal fallback when the AI
//! strategy is unavailable or fails. Pattern-matches one activity
//! signal, one prepositional location, and one explicit clock time.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use tracing::debug;

use super::{InterpretError, Interpreter};
use crate::domain::{IntentSource, PlanRequest, RawIntent};

/// Activity keywords that count as a signal worth planning around
const ACTIVITY_SIGNALS: &[&str] = &[
    // meals
    "breakfast", "brunch", "lunch", "dinner", "eat", "food", "restaurant",
    // cafe
    "coffee", "cafe", "espresso",
    // culture
    "museum", "gallery", "exhibit",
    // outdoors
    "park", "outdoor", "garden", "picnic",
    // drinks
    "bar", "drink", "drinks", "pub", "cocktail",
    // shopping
    "shop", "shopping", "store", "boutique", "market",
];

static TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b\d{1,2}(:\d{2})?\s*(am|pm)\b").expect("valid time regex"));

static LOCATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:in|at|near)\s+([A-Za-z][A-Za-z' -]*)").expect("valid location regex"));

/// Trailing words stripped from a captured location phrase
const LOCATION_STOPWORDS: &[&str] = &["at", "around", "about", "by", "from", "until"];

/// Deterministic fallback interpreter
#[derive(Default)]
pub struct HeuristicInterpreter;

impl HeuristicInterpreter {
    pub fn new() -> Self {
        Self
    }

    /// Interpret without the Result wrapper - this strategy cannot fail
    pub fn interpret_infallible(&self, request: &PlanRequest) -> Vec<RawIntent> {
        debug!(query = %request.query, "interpret_infallible: called");
        let query = request.query.trim();
        let lower = query.to_lowercase();

        let has_activity = ACTIVITY_SIGNALS.iter().any(|kw| contains_word(&lower, kw));
        let time_text = TIME_RE.find(query).map(|m| m.as_str().to_string());
        let location = extract_location(query);

        if !has_activity && time_text.is_none() {
            // No usable signal: one generic exploration intent at the
            // requested (or default) start time
            debug!("interpret_infallible: no signal, generic intent");
            return vec![RawIntent {
                location,
                activity: "explore the area".to_string(),
                time_text: request.start_time.clone(),
                venue_preference: None,
                keywords: Vec::new(),
                source: IntentSource::Flexible,
            }];
        }

        let source = if time_text.is_some() {
            IntentSource::Fixed
        } else {
            IntentSource::Flexible
        };
        let time_text = time_text.or_else(|| request.start_time.clone());

        debug!(?location, ?time_text, "interpret_infallible: signal found");
        vec![RawIntent {
            location,
            activity: query.to_string(),
            time_text,
            venue_preference: None,
            keywords: Vec::new(),
            source,
        }]
    }
}

#[async_trait]
impl Interpreter for HeuristicInterpreter {
    async fn interpret(&self, request: &PlanRequest) -> Result<Vec<RawIntent>, InterpretError> {
        Ok(self.interpret_infallible(request))
    }
}

/// Whole-word containment check
fn contains_word(haystack: &str, word: &str) -> bool {
    haystack
        .split(|c: char| !c.is_alphanumeric())
        .any(|token| token == word)
}

/// Extract a location phrase after "in"/"at"/"near"
fn extract_location(query: &str) -> Option<String> {
    let caps = LOCATION_RE.captures(query)?;
    let raw = caps.get(1)?.as_str();

    // The capture is greedy over letters, so trailing time prepositions
    // ("Soho at") land in it; strip them
    let mut words: Vec<&str> = raw.split_whitespace().collect();
    while let Some(last) = words.last() {
        if LOCATION_STOPWORDS.contains(&last.to_lowercase().as_str()) {
            words.pop();
        } else {
            break;
        }
    }

    let phrase = words.join(" ").trim_matches([',', '.']).trim().to_string();
    if phrase.is_empty() { None } else { Some(phrase) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interpret(query: &str) -> Vec<RawIntent> {
        HeuristicInterpreter::new().interpret_infallible(&PlanRequest::new(query, "nyc"))
    }

    #[test]
    fn test_activity_with_location_and_time() {
        let intents = interpret("Coffee in Soho at 10am");
        assert_eq!(intents.len(), 1);
        let intent = &intents[0];
        assert_eq!(intent.location.as_deref(), Some("Soho"));
        assert_eq!(intent.time_text.as_deref(), Some("10am"));
        assert_eq!(intent.source, IntentSource::Fixed);
    }

    #[test]
    fn test_activity_without_time_is_flexible() {
        let intents = interpret("museum visit");
        assert_eq!(intents.len(), 1);
        assert_eq!(intents[0].source, IntentSource::Flexible);
        assert_eq!(intents[0].activity, "museum visit");
        assert!(intents[0].time_text.is_none());
    }

    #[test]
    fn test_no_signal_gives_generic_intent() {
        let intents = interpret("surprise me");
        assert_eq!(intents.len(), 1);
        assert_eq!(intents[0].activity, "explore the area");
        assert_eq!(intents[0].source, IntentSource::Flexible);
    }

    #[test]
    fn test_generic_intent_uses_request_start_time() {
        let mut request = PlanRequest::new("surprise me", "nyc");
        request.start_time = Some("10:00".to_string());
        let intents = HeuristicInterpreter::new().interpret_infallible(&request);
        assert_eq!(intents[0].time_text.as_deref(), Some("10:00"));
    }

    #[test]
    fn test_location_near_pattern() {
        let intents = interpret("dinner near Chinatown");
        assert_eq!(intents[0].location.as_deref(), Some("Chinatown"));
    }

    #[test]
    fn test_time_only_at_pattern_is_not_location() {
        let intents = interpret("lunch at 1pm");
        assert!(intents[0].location.is_none());
        assert_eq!(intents[0].time_text.as_deref(), Some("1pm"));
    }

    #[test]
    fn test_time_with_minutes() {
        let intents = interpret("drinks at 6:30 pm in Williamsburg");
        assert_eq!(intents[0].time_text.as_deref(), Some("6:30 pm"));
        assert_eq!(intents[0].location.as_deref(), Some("Williamsburg"));
    }

    #[test]
    fn test_shopping_signal_detected() {
        let intents = interpret("boutique shopping");
        assert_eq!(intents[0].activity, "boutique shopping");
        assert_ne!(intents[0].activity, "explore the area");
    }
}
