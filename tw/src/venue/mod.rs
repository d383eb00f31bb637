//! Tiered venue resolution
//!
//! For each time block: run a targeted search (optionally LLM-rewritten),
//! filter to the city and category, fall back to a bare category search,
//! drop candidates confirmed closed, swap outdoor picks for indoor ones
//! when the forecast is bad, then draw a primary with rating-weighted
//! randomness and annotate alternatives.

mod filters;
mod select;

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tracing::{debug, warn};

use crate::capability::places::{PlaceCandidate, PlaceSearch};
use crate::capability::weather::{ForecastEntry, WeatherForecast};
use crate::config::{PipelineConfig, PlacesConfig};
use crate::domain::{haversine_m, ResolvedVenue, TimeBlock};
use crate::llm::{enhance_search_query, LlmClient};
use crate::location::gazetteer::CityContext;

#[derive(Debug, Error)]
pub enum VenueError {
    #[error("No venues found for '{activity}'")]
    NotFound { activity: String },
}

/// A resolved block: one primary venue plus ranked alternatives
#[derive(Debug, Clone)]
pub struct VenueChoice {
    pub primary: ResolvedVenue,
    pub alternatives: Vec<ResolvedVenue>,
}

/// Provider types indicating an outdoor venue
const OUTDOOR_TYPES: &[&str] = &[
    "park",
    "tourist_attraction",
    "stadium",
    "campground",
    "zoo",
    "amusement_park",
    "natural_feature",
];

/// Types that override the outdoor classification
const INDOOR_TYPES: &[&str] = &[
    "museum",
    "art_gallery",
    "restaurant",
    "cafe",
    "bar",
    "night_club",
    "shopping_mall",
    "movie_theater",
    "library",
    "aquarium",
    "bowling_alley",
];

/// How many hour-less candidates get a details lookup before the
/// hours filter runs
const DETAILS_BACKFILL_LIMIT: usize = 3;

pub struct VenueResolver {
    places: Arc<dyn PlaceSearch>,
    weather: Arc<dyn WeatherForecast>,
    llm: Option<Arc<dyn LlmClient>>,
    area_radius_m: u32,
    city_radius_m: u32,
    max_alternatives: usize,
}

impl VenueResolver {
    pub fn new(
        places: Arc<dyn PlaceSearch>,
        weather: Arc<dyn WeatherForecast>,
        llm: Option<Arc<dyn LlmClient>>,
        places_config: &PlacesConfig,
        pipeline_config: &PipelineConfig,
    ) -> Self {
        Self {
            places,
            weather,
            llm,
            area_radius_m: places_config.area_radius_m,
            city_radius_m: places_config.city_radius_m,
            max_alternatives: pipeline_config.max_alternatives,
        }
    }

    /// Resolve a block to a primary venue and alternatives
    pub async fn resolve(&self, block: &TimeBlock, city: &CityContext) -> Result<VenueChoice, VenueError> {
        let mut rng = StdRng::from_os_rng();
        self.resolve_with_rng(block, city, &mut rng).await
    }

    /// Same as [`resolve`](Self::resolve) with the selection rng injected
    pub async fn resolve_with_rng(
        &self,
        block: &TimeBlock,
        city: &CityContext,
        rng: &mut (impl Rng + Send),
    ) -> Result<VenueChoice, VenueError> {
        debug!(activity = %block.search_term, location = %block.location.name, "resolve: called");

        let (bias, radius_m) = match block.location.coords {
            Some((lat, lng)) => ((lat, lng), self.area_radius_m),
            None => ((city.center_lat, city.center_lng), self.city_radius_m),
        };

        let mut targeted = build_targeted_query(block, city);
        if let Some(llm) = &self.llm
            && let Some(rewritten) = enhance_search_query(llm, &targeted).await
        {
            debug!(original = %targeted, %rewritten, "resolve: query enhanced");
            targeted = rewritten;
        }
        let bare = format!("{} in {}", block.category.search_keyword(), city.name);

        let mut candidates = Vec::new();
        for (tier, query) in [(0u8, &targeted), (1u8, &bare)] {
            let found = match self.places.search(query, Some(bias), Some(radius_m)).await {
                Ok(found) => found,
                Err(e) => {
                    warn!(tier, %query, error = %e, "resolve: search failed, trying next tier");
                    continue;
                }
            };
            let found = filters::filter_by_city(found, city.address_aliases);
            let found = filters::filter_by_category(found, block.category);
            if !found.is_empty() {
                debug!(tier, count = found.len(), "resolve: tier produced candidates");
                candidates = found;
                break;
            }
            debug!(tier, %query, "resolve: tier empty after filters");
        }

        if candidates.is_empty() {
            return Err(VenueError::NotFound {
                activity: block.search_term.clone(),
            });
        }

        let candidates = self.backfill_hours(candidates).await;
        let candidates = filters::filter_by_hours(candidates, block.time.instant, city.timezone);
        let candidates = self.apply_weather(candidates, block, bias).await;

        let (primary, alternatives) = select::choose(candidates, block.min_rating, self.max_alternatives, rng);

        let primary_venue = to_venue(&primary, true, None, None);
        let alternatives = alternatives
            .iter()
            .map(|alt| {
                let distance = haversine_m(primary.lat, primary.lng, alt.lat, alt.lng);
                let reason = select::alternative_reason(alt, &primary);
                to_venue(alt, false, Some(distance), Some(reason))
            })
            .collect();

        debug!(primary = %primary_venue.name, "resolve: done");
        Ok(VenueChoice {
            primary: primary_venue,
            alternatives,
        })
    }

    /// Fetch details for the top few candidates missing opening hours
    async fn backfill_hours(&self, mut candidates: Vec<PlaceCandidate>) -> Vec<PlaceCandidate> {
        let mut looked_up = 0;
        for c in candidates.iter_mut() {
            if looked_up >= DETAILS_BACKFILL_LIMIT {
                break;
            }
            if c.open_periods.is_some() {
                continue;
            }
            looked_up += 1;
            match self.places.get_details(&c.place_id).await {
                Ok(detail) => c.open_periods = detail.open_periods,
                Err(e) => debug!(place_id = %c.place_id, error = %e, "backfill_hours: details lookup failed"),
            }
        }
        candidates
    }

    /// Swap the pool to indoor candidates when the forecast at the
    /// block instant is unsuitable for being outside
    ///
    /// Forecast failures count as suitable; this step never rejects a
    /// block.
    async fn apply_weather(
        &self,
        candidates: Vec<PlaceCandidate>,
        block: &TimeBlock,
        bias: (f64, f64),
    ) -> Vec<PlaceCandidate> {
        if !candidates.iter().any(|c| is_outdoor(&c.types)) {
            return candidates;
        }

        let entries = match self.weather.forecast(bias.0, bias.1).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, "apply_weather: forecast unavailable, assuming suitable");
                return candidates;
            }
        };
        if !unsuitable_at(&entries, block) {
            return candidates;
        }

        let indoor: Vec<PlaceCandidate> = candidates.iter().filter(|c| !is_outdoor(&c.types)).cloned().collect();
        if indoor.is_empty() {
            debug!("apply_weather: no indoor candidates, keeping outdoor pool");
            return candidates;
        }
        warn!(
            activity = %block.search_term,
            "apply_weather: forecast unsuitable for outdoors, preferring indoor venues"
        );
        indoor
    }
}

/// Outdoor when an outdoor type is present and no indoor type overrides it
fn is_outdoor(types: &[String]) -> bool {
    let outdoor = types.iter().any(|t| OUTDOOR_TYPES.contains(&t.as_str()));
    let indoor = types.iter().any(|t| INDOOR_TYPES.contains(&t.as_str()));
    outdoor && !indoor
}

/// Whether the forecast nearest the block instant rules out outdoor plans
fn unsuitable_at(entries: &[ForecastEntry], block: &TimeBlock) -> bool {
    let Some(entry) = entries
        .iter()
        .min_by_key(|e| (e.time - block.time.instant).num_seconds().abs())
    else {
        return false;
    };
    entry.condition.is_precipitation() || entry.temp_c < 5.0 || entry.temp_c > 30.0
}

/// Targeted tier-0 query from the block's activity, preference and location
fn build_targeted_query(block: &TimeBlock, city: &CityContext) -> String {
    let mut parts: Vec<&str> = Vec::new();
    if let Some(pref) = &block.venue_preference {
        parts.push(pref);
    }
    parts.push(&block.search_term);
    for kw in &block.keywords {
        parts.push(kw);
    }
    parts.push("in");
    if block.location.name.is_empty() {
        parts.push(city.name);
    } else {
        parts.push(&block.location.name);
    }
    parts.join(" ")
}

fn to_venue(c: &PlaceCandidate, is_primary: bool, distance_m: Option<f64>, reason: Option<String>) -> ResolvedVenue {
    ResolvedVenue {
        place_id: c.place_id.clone(),
        name: c.name.clone(),
        address: c.address.clone(),
        lat: c.lat,
        lng: c.lng,
        rating: c.rating,
        price_level: c.price_level,
        types: c.types.clone(),
        is_primary,
        distance_m,
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::places::mock::{candidate, MockPlaceSearch};
    use crate::capability::weather::mock::MockWeather;
    use crate::capability::weather::WeatherCondition;
    use crate::config::{PipelineConfig, PlacesConfig};
    use crate::capability::places::PlacesError;
    use crate::domain::{ActivityCategory, NormalizedTime};
    use crate::location::gazetteer;
    use crate::location::ResolvedLocation;
    use chrono::{TimeZone, Utc};

    fn resolver(places: MockPlaceSearch, weather: MockWeather) -> VenueResolver {
        VenueResolver::new(
            Arc::new(places),
            Arc::new(weather),
            None,
            &PlacesConfig::default(),
            &PipelineConfig::default(),
        )
    }

    fn block(category: ActivityCategory, search_term: &str) -> TimeBlock {
        let instant = Utc.with_ymd_and_hms(2025, 6, 16, 14, 0, 0).unwrap();
        let soho = nyc().find_area("Soho").unwrap();
        TimeBlock {
            location: ResolvedLocation::area(soho.name, soho.lat, soho.lng),
            time: NormalizedTime {
                canonical: "14:00".to_string(),
                instant,
                display: "2:00 PM".to_string(),
            },
            category,
            search_term: search_term.to_string(),
            venue_preference: None,
            keywords: Vec::new(),
            min_rating: 4.0,
        }
    }

    fn clear_weather() -> MockWeather {
        MockWeather::new(vec![ForecastEntry {
            time: Utc.with_ymd_and_hms(2025, 6, 16, 15, 0, 0).unwrap(),
            condition: WeatherCondition::Clear,
            temp_c: 22.0,
        }])
    }

    fn nyc() -> &'static CityContext {
        gazetteer::city("nyc").unwrap()
    }

    #[tokio::test]
    async fn test_resolve_picks_primary_and_alternatives() {
        let places = MockPlaceSearch::new(vec![Ok(vec![
            candidate("a", "Ground Support", "399 W Broadway, New York, NY", 4.6, &["cafe"]),
            candidate("b", "La Colombe", "270 Lafayette St, New York, NY", 4.5, &["cafe"]),
            candidate("c", "Gas N Go", "1 Turnpike, Newark, NJ", 4.0, &["gas_station"]),
        ])]);
        let r = resolver(places, clear_weather());
        let mut rng = StdRng::seed_from_u64(42);

        let choice = r
            .resolve_with_rng(&block(ActivityCategory::Cafe, "coffee"), nyc(), &mut rng)
            .await
            .unwrap();

        assert!(choice.primary.is_primary);
        // the Newark gas station fails both city and category filters
        assert_ne!(choice.primary.place_id, "c");
        assert_eq!(choice.alternatives.len(), 1);
        assert!(!choice.alternatives[0].is_primary);
        assert!(choice.alternatives[0].distance_m.is_some());
        assert!(choice.alternatives[0].reason.is_some());
    }

    #[tokio::test]
    async fn test_resolve_falls_back_to_bare_tier() {
        let places = MockPlaceSearch::new(vec![
            Ok(vec![]),
            Ok(vec![candidate(
                "m",
                "The Met",
                "1000 5th Ave, New York, NY",
                4.8,
                &["museum"],
            )]),
        ]);
        let r = resolver(places, clear_weather());
        let mut rng = StdRng::seed_from_u64(1);

        let choice = r
            .resolve_with_rng(&block(ActivityCategory::Museum, "a museum"), nyc(), &mut rng)
            .await
            .unwrap();
        assert_eq!(choice.primary.place_id, "m");
    }

    #[tokio::test]
    async fn test_resolve_not_found_when_both_tiers_empty() {
        let places = MockPlaceSearch::new(vec![Ok(vec![]), Ok(vec![])]);
        let r = resolver(places, clear_weather());
        let mut rng = StdRng::seed_from_u64(1);

        let err = r
            .resolve_with_rng(&block(ActivityCategory::Bar, "a dive bar"), nyc(), &mut rng)
            .await
            .unwrap_err();
        assert!(matches!(err, VenueError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_resolve_search_error_falls_through_tiers() {
        let places = MockPlaceSearch::new(vec![
            Err(PlacesError::InvalidResponse("upstream timed out".to_string())),
            Ok(vec![candidate(
                "p",
                "Bryant Park",
                "New York, NY",
                4.7,
                &["park"],
            )]),
        ]);
        let r = resolver(places, clear_weather());
        let mut rng = StdRng::seed_from_u64(1);

        let choice = r
            .resolve_with_rng(&block(ActivityCategory::Park, "a park"), nyc(), &mut rng)
            .await
            .unwrap();
        assert_eq!(choice.primary.place_id, "p");
    }

    #[tokio::test]
    async fn test_storm_prefers_indoor_candidate() {
        let places = MockPlaceSearch::new(vec![Ok(vec![
            candidate("out", "Washington Sq Park", "New York, NY", 4.8, &["park"]),
            candidate("in", "Drawing Center", "35 Wooster St, New York, NY", 4.5, &["art_gallery"]),
        ])]);
        let weather = MockWeather::new(vec![ForecastEntry {
            time: Utc.with_ymd_and_hms(2025, 6, 16, 14, 0, 0).unwrap(),
            condition: WeatherCondition::Thunderstorm,
            temp_c: 19.0,
        }]);
        let r = resolver(places, weather);
        let mut rng = StdRng::seed_from_u64(9);

        let choice = r
            .resolve_with_rng(&block(ActivityCategory::Attraction, "something fun"), nyc(), &mut rng)
            .await
            .unwrap();
        assert_eq!(choice.primary.place_id, "in");
    }

    #[tokio::test]
    async fn test_weather_failure_keeps_outdoor_pool() {
        let places = MockPlaceSearch::new(vec![Ok(vec![candidate(
            "out",
            "Central Park",
            "New York, NY",
            4.8,
            &["park"],
        )])]);
        let r = resolver(places, MockWeather::failing());
        let mut rng = StdRng::seed_from_u64(2);

        let choice = r
            .resolve_with_rng(&block(ActivityCategory::Park, "a park"), nyc(), &mut rng)
            .await
            .unwrap();
        assert_eq!(choice.primary.place_id, "out");
    }

    #[test]
    fn test_is_outdoor_indoor_override() {
        let park = vec!["park".to_string(), "point_of_interest".to_string()];
        let museum = vec!["museum".to_string(), "tourist_attraction".to_string()];
        assert!(is_outdoor(&park));
        assert!(!is_outdoor(&museum));
    }

    #[test]
    fn test_targeted_query_includes_preference_and_location() {
        let mut b = block(ActivityCategory::Restaurant, "lunch");
        b.venue_preference = Some("dim sum".to_string());
        b.keywords = vec!["cheap".to_string()];
        assert_eq!(build_targeted_query(&b, nyc()), "dim sum lunch cheap in Soho");
    }
}
