//! Curated gazetteer of named areas per city
//!
//! Checked before any external geocoding. Each city carries its IANA
//! timezone, center coordinates, and the address aliases used by the
//! venue resolver's city filter.

use chrono_tz::Tz;

/// A named area within a city
#[derive(Debug, Clone, Copy)]
pub struct Area {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub lat: f64,
    pub lng: f64,
}

/// A supported city with its areas and filter aliases
#[derive(Debug, Clone, Copy)]
pub struct CityContext {
    /// Gazetteer key ("nyc")
    pub id: &'static str,
    /// Display name ("New York")
    pub name: &'static str,
    /// IANA timezone
    pub timezone: Tz,
    pub center_lat: f64,
    pub center_lng: f64,
    /// Address substrings that confirm a venue is in this city.
    /// Two-letter entries are matched with word boundaries.
    pub address_aliases: &'static [&'static str],
    pub areas: &'static [Area],
}

const NYC_AREAS: &[Area] = &[
    Area {
        name: "Soho",
        aliases: &["soho", "south of houston"],
        lat: 40.7246,
        lng: -74.0019,
    },
    Area {
        name: "Chinatown",
        aliases: &["chinatown"],
        lat: 40.7158,
        lng: -73.9970,
    },
    Area {
        name: "East Village",
        aliases: &["east village", "ev"],
        lat: 40.7265,
        lng: -73.9815,
    },
    Area {
        name: "West Village",
        aliases: &["west village", "greenwich village", "the village"],
        lat: 40.7336,
        lng: -74.0027,
    },
    Area {
        name: "Midtown",
        aliases: &["midtown", "midtown manhattan"],
        lat: 40.7549,
        lng: -73.9840,
    },
    Area {
        name: "Times Square",
        aliases: &["times square", "times sq"],
        lat: 40.7580,
        lng: -73.9855,
    },
    Area {
        name: "Lower East Side",
        aliases: &["lower east side", "les"],
        lat: 40.7150,
        lng: -73.9843,
    },
    Area {
        name: "Upper East Side",
        aliases: &["upper east side", "ues"],
        lat: 40.7736,
        lng: -73.9566,
    },
    Area {
        name: "Financial District",
        aliases: &["financial district", "fidi", "wall street"],
        lat: 40.7075,
        lng: -74.0113,
    },
    Area {
        name: "Williamsburg",
        aliases: &["williamsburg"],
        lat: 40.7081,
        lng: -73.9571,
    },
    Area {
        name: "Harlem",
        aliases: &["harlem"],
        lat: 40.8116,
        lng: -73.9465,
    },
    Area {
        name: "Central Park",
        aliases: &["central park"],
        lat: 40.7829,
        lng: -73.9654,
    },
];

const SF_AREAS: &[Area] = &[
    Area {
        name: "Mission District",
        aliases: &["mission", "mission district", "the mission"],
        lat: 37.7599,
        lng: -122.4148,
    },
    Area {
        name: "North Beach",
        aliases: &["north beach"],
        lat: 37.8060,
        lng: -122.4103,
    },
    Area {
        name: "Chinatown",
        aliases: &["chinatown"],
        lat: 37.7941,
        lng: -122.4078,
    },
    Area {
        name: "SoMa",
        aliases: &["soma", "south of market"],
        lat: 37.7785,
        lng: -122.4056,
    },
    Area {
        name: "Haight-Ashbury",
        aliases: &["haight", "haight-ashbury", "the haight"],
        lat: 37.7692,
        lng: -122.4481,
    },
    Area {
        name: "Fisherman's Wharf",
        aliases: &["fisherman's wharf", "fishermans wharf", "the wharf"],
        lat: 37.8080,
        lng: -122.4177,
    },
    Area {
        name: "Nob Hill",
        aliases: &["nob hill"],
        lat: 37.7930,
        lng: -122.4161,
    },
    Area {
        name: "Castro",
        aliases: &["castro", "the castro"],
        lat: 37.7609,
        lng: -122.4350,
    },
    Area {
        name: "Golden Gate Park",
        aliases: &["golden gate park", "gg park"],
        lat: 37.7694,
        lng: -122.4862,
    },
];

const LONDON_AREAS: &[Area] = &[
    Area {
        name: "Soho",
        aliases: &["soho"],
        lat: 51.5137,
        lng: -0.1366,
    },
    Area {
        name: "Shoreditch",
        aliases: &["shoreditch"],
        lat: 51.5245,
        lng: -0.0786,
    },
    Area {
        name: "Camden",
        aliases: &["camden", "camden town"],
        lat: 51.5390,
        lng: -0.1426,
    },
    Area {
        name: "Covent Garden",
        aliases: &["covent garden"],
        lat: 51.5117,
        lng: -0.1240,
    },
    Area {
        name: "South Bank",
        aliases: &["south bank", "southbank", "near the river"],
        lat: 51.5058,
        lng: -0.1147,
    },
    Area {
        name: "Notting Hill",
        aliases: &["notting hill"],
        lat: 51.5090,
        lng: -0.1963,
    },
    Area {
        name: "Mayfair",
        aliases: &["mayfair"],
        lat: 51.5095,
        lng: -0.1480,
    },
    Area {
        name: "Greenwich",
        aliases: &["greenwich"],
        lat: 51.4826,
        lng: -0.0077,
    },
    Area {
        name: "Kensington",
        aliases: &["kensington", "south kensington"],
        lat: 51.4990,
        lng: -0.1938,
    },
];

const CITIES: &[CityContext] = &[
    CityContext {
        id: "nyc",
        name: "New York",
        timezone: chrono_tz::America::New_York,
        center_lat: 40.7580,
        center_lng: -73.9855,
        address_aliases: &["New York", "NY", "NYC", "Manhattan", "Brooklyn", "Queens"],
        areas: NYC_AREAS,
    },
    CityContext {
        id: "sf",
        name: "San Francisco",
        timezone: chrono_tz::America::Los_Angeles,
        center_lat: 37.7793,
        center_lng: -122.4193,
        address_aliases: &["San Francisco", "SF", "CA"],
        areas: SF_AREAS,
    },
    CityContext {
        id: "london",
        name: "London",
        timezone: chrono_tz::Europe::London,
        address_aliases: &["London", "UK", "United Kingdom", "England"],
        center_lat: 51.5074,
        center_lng: -0.1278,
        areas: LONDON_AREAS,
    },
];

/// Look up a city by gazetteer key
pub fn city(id: &str) -> Option<&'static CityContext> {
    CITIES.iter().find(|c| c.id == id.to_lowercase())
}

/// All supported city ids
pub fn city_ids() -> Vec<&'static str> {
    CITIES.iter().map(|c| c.id).collect()
}

impl CityContext {
    /// Find an area by exact name or alias match (case-insensitive)
    pub fn find_area(&self, phrase: &str) -> Option<&'static Area> {
        let needle = phrase.trim().to_lowercase();
        self.areas
            .iter()
            .find(|a| a.name.to_lowercase() == needle || a.aliases.contains(&needle.as_str()))
    }
}
