//! Primary selection and alternative annotation
//!
//! The primary is drawn from the qualifying pool with probability
//! proportional to rating squared, so a 4.8 beats a 4.1 most of the
//! time without the top result winning every run.

use rand::Rng;
use tracing::debug;

use crate::capability::places::PlaceCandidate;

/// Provider types too generic to distinguish two venues
const GENERIC_TYPES: &[&str] = &["establishment", "point_of_interest", "food"];

/// Pick a primary and a ranked list of alternatives
///
/// Candidates rated below `min_rating` (or unrated) are out of the
/// pool unless that would leave it empty, in which case everyone
/// qualifies. Alternatives come back sorted by rating descending,
/// capped at `max_alternatives`.
pub fn choose(
    mut candidates: Vec<PlaceCandidate>,
    min_rating: f64,
    max_alternatives: usize,
    rng: &mut impl Rng,
) -> (PlaceCandidate, Vec<PlaceCandidate>) {
    debug_assert!(!candidates.is_empty());

    let qualifying: Vec<usize> = candidates
        .iter()
        .enumerate()
        .filter(|(_, c)| c.rating.is_some_and(|r| r >= min_rating))
        .map(|(i, _)| i)
        .collect();
    let pool: Vec<usize> = if qualifying.is_empty() {
        debug!(min_rating, "choose: no candidate meets the rating floor, using all");
        (0..candidates.len()).collect()
    } else {
        qualifying
    };

    let primary_idx = weighted_draw(&candidates, &pool, rng);
    let primary = candidates.swap_remove(primary_idx);

    // swap_remove reordered the tail, so re-filter rather than reuse pool
    let mut alternatives: Vec<PlaceCandidate> = candidates
        .into_iter()
        .filter(|c| c.rating.is_some_and(|r| r >= min_rating))
        .collect();
    alternatives.sort_by(|a, b| {
        b.rating
            .unwrap_or(0.0)
            .partial_cmp(&a.rating.unwrap_or(0.0))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    alternatives.truncate(max_alternatives);

    debug!(primary = %primary.name, alternatives = alternatives.len(), "choose: done");
    (primary, alternatives)
}

/// Cumulative-weight draw over the pool, weight = rating²
fn weighted_draw(candidates: &[PlaceCandidate], pool: &[usize], rng: &mut impl Rng) -> usize {
    let weights: Vec<f64> = pool
        .iter()
        .map(|&i| {
            let r = candidates[i].rating.unwrap_or(0.0);
            (r * r).max(0.01)
        })
        .collect();
    let total: f64 = weights.iter().sum();

    let mut draw = rng.random_range(0.0..total);
    for (w, &i) in weights.iter().zip(pool) {
        if draw < *w {
            return i;
        }
        draw -= w;
    }
    pool[pool.len() - 1]
}

/// Human-readable reason an alternative made the list
pub fn alternative_reason(alt: &PlaceCandidate, primary: &PlaceCandidate) -> String {
    if let (Some(ar), Some(pr)) = (alt.rating, primary.rating)
        && ar > pr
    {
        return format!("Rated {ar:.1}, higher than the pick");
    }

    if let Some(t) = alt
        .types
        .iter()
        .find(|t| !GENERIC_TYPES.contains(&t.as_str()) && !primary.types.contains(t))
    {
        return format!("Also a {}", t.replace('_', " "));
    }

    match (alt.price_level, primary.price_level) {
        (Some(a), Some(p)) if a < p => "A cheaper option".to_string(),
        (Some(a), Some(p)) if a > p => "A more upscale option".to_string(),
        _ => "Another well-reviewed spot nearby".to_string(),
    }
}
