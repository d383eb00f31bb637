//! Candidate filters: city boundary, category anti-patterns, hours
//!
//! Filters narrow, never empty: whenever a filter would reject every
//! candidate it is skipped instead, on the theory that a weak match
//! beats no match.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::{debug, warn};

use crate::capability::places::PlaceCandidate;
use crate::domain::ActivityCategory;

/// Per-category type filter: disqualifying and confirming provider types
struct CategoryFilter {
    category: ActivityCategory,
    exclude: &'static [&'static str],
    require_one_of: &'static [&'static str],
}

/// Categories whose searches are known to attract junk results
const CATEGORY_FILTERS: &[CategoryFilter] = &[
    CategoryFilter {
        category: ActivityCategory::Cafe,
        // Cafe searches notoriously return gas stations and hotel lobbies
        exclude: &["gas_station", "lodging", "convenience_store"],
        require_one_of: &["cafe", "coffee_shop", "bakery", "restaurant", "food"],
    },
    CategoryFilter {
        category: ActivityCategory::Restaurant,
        exclude: &["gas_station", "lodging", "convenience_store"],
        require_one_of: &["restaurant", "food", "meal_takeaway", "meal_delivery"],
    },
    CategoryFilter {
        category: ActivityCategory::Bar,
        exclude: &["lodging", "liquor_store"],
        require_one_of: &["bar", "night_club", "restaurant"],
    },
];

/// Keep candidates whose address matches one of the city's aliases
///
/// Short aliases (state/city codes like "NY") are matched with word
/// boundaries so "SUNY" or "ALBANY ROAD" do not count.
pub fn filter_by_city(candidates: Vec<PlaceCandidate>, aliases: &[&str]) -> Vec<PlaceCandidate> {
    let before = candidates.len();
    let kept: Vec<PlaceCandidate> = candidates
        .into_iter()
        .filter(|c| aliases.iter().any(|alias| address_contains(&c.address, alias)))
        .collect();
    debug!(before, after = kept.len(), "filter_by_city: done");
    kept
}

/// Case-insensitive containment with word boundaries on both sides
fn address_contains(address: &str, alias: &str) -> bool {
    let haystack = address.to_lowercase();
    let needle = alias.to_lowercase();
    let hay: &[u8] = haystack.as_bytes();

    let mut start = 0;
    while let Some(pos) = haystack[start..].find(&needle) {
        let begin = start + pos;
        let end = begin + needle.len();
        let left_ok = begin == 0 || !hay[begin - 1].is_ascii_alphanumeric();
        let right_ok = end == hay.len() || !hay[end].is_ascii_alphanumeric();
        if left_ok && right_ok {
            return true;
        }
        start = begin + 1;
    }
    false
}

/// Apply the category anti-pattern filter, skipping it when it would
/// empty the candidate set
pub fn filter_by_category(candidates: Vec<PlaceCandidate>, category: ActivityCategory) -> Vec<PlaceCandidate> {
    let Some(filter) = CATEGORY_FILTERS.iter().find(|f| f.category == category) else {
        return candidates;
    };

    let kept: Vec<PlaceCandidate> = candidates
        .iter()
        .filter(|c| {
            let excluded = c.types.iter().any(|t| filter.exclude.contains(&t.as_str()));
            let confirmed = c.types.iter().any(|t| filter.require_one_of.contains(&t.as_str()));
            !excluded && confirmed
        })
        .cloned()
        .collect();

    if kept.is_empty() {
        debug!(%category, "filter_by_category: filter would empty set, skipping");
        return candidates;
    }
    debug!(%category, before = candidates.len(), after = kept.len(), "filter_by_category: done");
    kept
}

/// Drop candidates confirmed closed at the scheduled instant
///
/// Unknown hours pass through. If every candidate is confirmed closed
/// the filter is ignored with a warning rather than failing the block.
pub fn filter_by_hours(candidates: Vec<PlaceCandidate>, instant: DateTime<Utc>, tz: Tz) -> Vec<PlaceCandidate> {
    let kept: Vec<PlaceCandidate> = candidates
        .iter()
        .filter(|c| c.is_open_at(instant, tz) != Some(false))
        .cloned()
        .collect();

    if kept.is_empty() && !candidates.is_empty() {
        warn!("filter_by_hours: every candidate confirmed closed, ignoring hours filter");
        return candidates;
    }
    debug!(before = candidates.len(), after = kept.len(), "filter_by_hours: done");
    kept
}
