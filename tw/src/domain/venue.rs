//! ResolvedVenue and TravelSegment records

use serde::{Deserialize, Serialize};

/// A concrete venue chosen for a TimeBlock
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedVenue {
    /// External place identifier from the search capability
    pub place_id: String,

    /// Venue name
    pub name: String,

    /// Formatted address
    pub address: String,

    /// Latitude
    pub lat: f64,

    /// Longitude
    pub lng: f64,

    /// Rating on the provider's scale (typically 1.0-5.0)
    pub rating: Option<f64>,

    /// Price level 0 (free) - 4 (expensive)
    pub price_level: Option<u8>,

    /// Provider category tags ("cafe", "point_of_interest", ...)
    pub types: Vec<String>,

    /// Whether this is the primary pick for its block
    pub is_primary: bool,

    /// Distance in meters from the primary pick (alternatives only)
    pub distance_m: Option<f64>,

    /// Human-readable reason this venue is suggested (alternatives only)
    pub reason: Option<String>,
}

/// Travel estimate linking venue i to venue i+1
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TravelSegment {
    /// Estimated duration in minutes
    pub duration_min: u32,

    /// Name of the destination venue
    pub to: String,
}

/// Haversine great-circle distance between two lat/lng points in meters
pub fn haversine_m(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    const EARTH_RADIUS_M: f64 = 6_371_000.0;
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();
    let lat1_r = lat1.to_radians();
    let lat2_r = lat2.to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat1_r.cos() * lat2_r.cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();
    EARTH_RADIUS_M * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_same_point_is_zero() {
        assert_eq!(haversine_m(40.7, -74.0, 40.7, -74.0), 0.0);
    }

    #[test]
    fn test_haversine_soho_to_chinatown() {
        // Roughly 1.3 km apart in Manhattan
        let d = haversine_m(40.7246, -74.0019, 40.7158, -73.9970);
        assert!(d > 800.0 && d < 1800.0, "got {d}");
    }
}
