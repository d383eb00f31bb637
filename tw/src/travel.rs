//! Travel estimates between consecutive stops
//!
//! Straight-line walking estimates only. Good enough to order a day;
//! not a routing engine.

use tracing::debug;

use crate::domain::{haversine_m, ResolvedVenue, TravelSegment};

/// Walking speed used for estimates, meters per minute (4.8 km/h)
const WALK_M_PER_MIN: f64 = 80.0;

/// Floor so adjacent-door stops still read as a short walk
const MIN_TRAVEL_MIN: u32 = 5;

/// Beyond this distance assume transit rather than a straight walk
const TRANSIT_THRESHOLD_M: f64 = 2_000.0;

/// Transit-style pace applied past the threshold, meters per minute
const TRANSIT_M_PER_MIN: f64 = 100.0;

/// Build one segment per consecutive primary pair
///
/// `default_min` applies when either endpoint is missing coordinates.
pub fn stitch(primaries: &[&ResolvedVenue], default_min: u32) -> Vec<TravelSegment> {
    debug!(stops = primaries.len(), "stitch: called");
    primaries
        .windows(2)
        .map(|pair| {
            let (from, to) = (pair[0], pair[1]);
            TravelSegment {
                duration_min: estimate_min(from, to, default_min),
                to: to.name.clone(),
            }
        })
        .collect()
}

fn estimate_min(from: &ResolvedVenue, to: &ResolvedVenue, default_min: u32) -> u32 {
    if !coords_usable(from) || !coords_usable(to) {
        debug!(from = %from.name, to = %to.name, "estimate_min: missing coordinates, using default");
        return default_min;
    }

    let dist_m = haversine_m(from.lat, from.lng, to.lat, to.lng);
    let minutes = if dist_m <= TRANSIT_THRESHOLD_M {
        dist_m / WALK_M_PER_MIN
    } else {
        TRANSIT_THRESHOLD_M / WALK_M_PER_MIN + (dist_m - TRANSIT_THRESHOLD_M) / TRANSIT_M_PER_MIN
    };
    (minutes.ceil() as u32).max(MIN_TRAVEL_MIN)
}

fn coords_usable(v: &ResolvedVenue) -> bool {
    v.lat != 0.0 || v.lng != 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn venue(name: &str, lat: f64, lng: f64) -> ResolvedVenue {
        ResolvedVenue {
            place_id: name.to_lowercase(),
            name: name.to_string(),
            address: String::new(),
            lat,
            lng,
            rating: Some(4.5),
            price_level: None,
            types: Vec::new(),
            is_primary: true,
            distance_m: None,
            reason: None,
        }
    }

    #[test]
    fn test_stitch_one_segment_per_pair() {
        let a = venue("A", 40.723, -74.003);
        let b = venue("B", 40.716, -73.996);
        let c = venue("C", 40.728, -73.986);
        let segments = stitch(&[&a, &b, &c], 15);

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].to, "B");
        assert_eq!(segments[1].to, "C");
    }

    #[test]
    fn test_short_hop_floors_at_five_minutes() {
        // ~150 m apart
        let a = venue("A", 40.7230, -74.0030);
        let b = venue("B", 40.7243, -74.0030);
        let segments = stitch(&[&a, &b], 15);
        assert_eq!(segments[0].duration_min, 5);
    }

    #[test]
    fn test_walkable_distance_uses_walking_pace() {
        // ~1.6 km apart: 20 min at 80 m/min
        let a = venue("A", 40.7230, -74.0030);
        let b = venue("B", 40.7374, -74.0030);
        let segments = stitch(&[&a, &b], 15);
        assert!(segments[0].duration_min >= 18 && segments[0].duration_min <= 22);
    }

    #[test]
    fn test_long_distance_capped_by_transit_pace() {
        // ~8.9 km apart: pure walking would be ~111 min, transit-style
        // pace past 2 km keeps it near 25 + 69 = ~94 min
        let a = venue("A", 40.7230, -74.0030);
        let b = venue("B", 40.8030, -74.0030);
        let segments = stitch(&[&a, &b], 15);
        assert!(segments[0].duration_min < 100, "got {}", segments[0].duration_min);
        assert!(segments[0].duration_min > 80, "got {}", segments[0].duration_min);
    }

    #[test]
    fn test_missing_coords_uses_default() {
        let a = venue("A", 0.0, 0.0);
        let b = venue("B", 40.716, -73.996);
        let segments = stitch(&[&a, &b], 15);
        assert_eq!(segments[0].duration_min, 15);
    }

    #[test]
    fn test_single_stop_no_segments() {
        let a = venue("A", 40.723, -74.003);
        assert!(stitch(&[&a], 15).is_empty());
    }
}
