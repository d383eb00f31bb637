//! LocationResolver - gazetteer-first location normalization

use std::sync::Arc;

use tracing::{debug, warn};

use super::gazetteer::CityContext;
use super::{LocationKind, ResolvedLocation};
use crate::capability::geocode::Geocoder;
use crate::domain::haversine_m;

/// A geocoder hit farther than this from the city center is rejected
const CITY_BOUND_M: f64 = 30_000.0;

/// Maximum edit distance for a gazetteer name to count as a suggestion
const SUGGESTION_DISTANCE: usize = 3;

/// Street/transit abbreviations expanded before re-matching
const ABBREVIATIONS: &[(&str, &str)] = &[
    ("st", "street"),
    ("st.", "street"),
    ("ave", "avenue"),
    ("ave.", "avenue"),
    ("blvd", "boulevard"),
    ("rd", "road"),
    ("sq", "square"),
    ("sq.", "square"),
    ("stn", "station"),
    ("bldg", "building"),
];

/// Resolves free-text location phrases against the gazetteer, then the
/// external geocoder
pub struct LocationResolver {
    geocoder: Option<Arc<dyn Geocoder>>,
}

impl LocationResolver {
    pub fn new(geocoder: Option<Arc<dyn Geocoder>>) -> Self {
        Self { geocoder }
    }

    /// Normalize a location phrase for a target city
    ///
    /// Never fails: an unmatched phrase comes back unchanged with
    /// near-match suggestions attached.
    pub async fn resolve(&self, phrase: &str, city: &CityContext) -> ResolvedLocation {
        let phrase = phrase.trim();
        debug!(%phrase, city = city.id, "resolve: called");

        if phrase.is_empty() {
            return ResolvedLocation::city_center(city);
        }

        // 1. Exact/alias gazetteer match
        if let Some(area) = city.find_area(phrase) {
            debug!(area = area.name, "resolve: gazetteer match");
            return ResolvedLocation::area(area.name, area.lat, area.lng);
        }

        // 2. Street/transit abbreviation expansion, then re-match
        if looks_like_street(phrase) {
            let expanded = expand_abbreviations(phrase);
            if expanded != phrase.to_lowercase()
                && let Some(area) = city.find_area(&expanded)
            {
                debug!(area = area.name, "resolve: matched after expansion");
                return ResolvedLocation::area(area.name, area.lat, area.lng);
            }
        }

        // 3. External geocoder, accepting only in-city results
        if let Some(geocoder) = &self.geocoder {
            match geocoder.resolve(phrase, city.name).await {
                Ok(Some(result)) => {
                    let dist = haversine_m(result.lat, result.lng, city.center_lat, city.center_lng);
                    if dist <= CITY_BOUND_M {
                        debug!(name = %result.canonical_name, dist_m = dist, "resolve: geocoded");
                        return ResolvedLocation {
                            name: result.canonical_name,
                            coords: Some((result.lat, result.lng)),
                            kind: LocationKind::Geocoded,
                            suggestions: Vec::new(),
                        };
                    }
                    debug!(dist_m = dist, "resolve: geocoder hit outside city bounds");
                }
                Ok(None) => debug!(%phrase, "resolve: geocoder found nothing"),
                Err(e) => warn!(%phrase, error = %e, "resolve: geocoder error, passing phrase through"),
            }
        }

        // 4. Unresolved: keep the phrase, suggest near matches
        let suggestions = self.suggestions(phrase, city);
        debug!(%phrase, ?suggestions, "resolve: unresolved");
        ResolvedLocation::unresolved(phrase, suggestions)
    }

    /// Levenshtein-nearest gazetteer names for error messages
    fn suggestions(&self, phrase: &str, city: &CityContext) -> Vec<String> {
        let needle = phrase.to_lowercase();
        let mut scored: Vec<(usize, &str)> = city
            .areas
            .iter()
            .map(|a| (levenshtein(&needle, &a.name.to_lowercase()), a.name))
            .filter(|(d, _)| *d <= SUGGESTION_DISTANCE)
            .collect();
        scored.sort_by_key(|(d, _)| *d);
        scored.into_iter().take(3).map(|(_, name)| name.to_string()).collect()
    }
}

/// Heuristic for street/transit references worth expanding
fn looks_like_street(phrase: &str) -> bool {
    let lower = phrase.to_lowercase();
    lower.chars().any(|c| c.is_ascii_digit())
        || lower
            .split_whitespace()
            .any(|w| ABBREVIATIONS.iter().any(|(abbr, _)| *abbr == w))
}

/// Expand known abbreviations token by token
fn expand_abbreviations(phrase: &str) -> String {
    phrase
        .to_lowercase()
        .split_whitespace()
        .map(|w| {
            ABBREVIATIONS
                .iter()
                .find(|(abbr, _)| *abbr == w)
                .map_or(w.to_string(), |(_, full)| full.to_string())
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Classic Levenshtein edit distance
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::geocode::mock::MockGeocoder;
    use crate::capability::geocode::GeocodeResult;
    use crate::location::city;
    use std::collections::HashMap;

    fn nyc() -> &'static CityContext {
        city("nyc").unwrap()
    }

    #[tokio::test]
    async fn test_gazetteer_exact_and_alias() {
        let resolver = LocationResolver::new(None);

        let loc = resolver.resolve("Soho", nyc()).await;
        assert_eq!(loc.kind, LocationKind::Area);
        assert_eq!(loc.name, "Soho");
        assert!(loc.coords.is_some());

        let loc = resolver.resolve("fidi", nyc()).await;
        assert_eq!(loc.name, "Financial District");
    }

    #[tokio::test]
    async fn test_empty_phrase_is_city_center() {
        let resolver = LocationResolver::new(None);
        let loc = resolver.resolve("", nyc()).await;
        assert_eq!(loc.name, "New York");
        assert_eq!(loc.coords, Some((40.7580, -73.9855)));
    }

    #[tokio::test]
    async fn test_abbreviation_expansion() {
        let resolver = LocationResolver::new(None);
        let loc = resolver.resolve("times sq", nyc()).await;
        assert_eq!(loc.name, "Times Square");
    }

    #[tokio::test]
    async fn test_geocoder_accepts_in_city_result() {
        let mut results = HashMap::new();
        results.insert(
            "flatiron".to_string(),
            GeocodeResult {
                canonical_name: "Flatiron District".to_string(),
                lat: 40.7411,
                lng: -73.9897,
            },
        );
        let resolver = LocationResolver::new(Some(Arc::new(MockGeocoder::new(results))));

        let loc = resolver.resolve("flatiron", nyc()).await;
        assert_eq!(loc.kind, LocationKind::Geocoded);
        assert_eq!(loc.name, "Flatiron District");
    }

    #[tokio::test]
    async fn test_geocoder_rejects_out_of_city_result() {
        let mut results = HashMap::new();
        results.insert(
            "springfield".to_string(),
            GeocodeResult {
                canonical_name: "Springfield, IL".to_string(),
                lat: 39.7817,
                lng: -89.6501,
            },
        );
        let resolver = LocationResolver::new(Some(Arc::new(MockGeocoder::new(results))));

        let loc = resolver.resolve("springfield", nyc()).await;
        assert_eq!(loc.kind, LocationKind::Unresolved);
        assert_eq!(loc.name, "springfield");
    }

    #[tokio::test]
    async fn test_geocoder_error_falls_through_to_unresolved() {
        let resolver = LocationResolver::new(Some(Arc::new(MockGeocoder::failing())));
        let loc = resolver.resolve("nowhere special", nyc()).await;
        assert_eq!(loc.kind, LocationKind::Unresolved);
        assert_eq!(loc.name, "nowhere special");
    }

    #[tokio::test]
    async fn test_typo_gets_suggestions() {
        let resolver = LocationResolver::new(None);
        let loc = resolver.resolve("sohoo", nyc()).await;
        assert_eq!(loc.kind, LocationKind::Unresolved);
        assert!(loc.suggestions.contains(&"Soho".to_string()));
    }

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein("soho", "soho"), 0);
        assert_eq!(levenshtein("soho", "sohoo"), 1);
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("", "abc"), 3);
    }
}
