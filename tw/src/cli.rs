//! CLI command definitions and output rendering

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

use crate::domain::Itinerary;
use crate::location::gazetteer;

/// TripWeave - turn a free-text day plan into a verified itinerary
#[derive(Parser)]
#[command(
    name = "tw",
    about = "Turn a free-text day plan into a time-ordered, verified itinerary",
    version
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Plan a day from a free-text query
    Plan {
        /// The day plan, e.g. "coffee in Soho at 10am, lunch in Chinatown at 1pm"
        query: String,

        /// Target city id (see `tw cities`)
        #[arg(short = 'C', long, default_value = "nyc")]
        city: String,

        /// Plan date (YYYY-MM-DD, default today in the city's zone)
        #[arg(short, long)]
        date: Option<String>,

        /// Default start time for unanchored activities (e.g. "10am")
        #[arg(short, long)]
        start_time: Option<String>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Show a stored itinerary
    Show {
        /// Itinerary id
        id: String,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// List stored itinerary ids
    List,

    /// Delete a stored itinerary
    Delete {
        /// Itinerary id
        id: String,
    },

    /// List supported cities
    Cities,
}

/// Output format for plan/show commands
#[derive(Clone, Debug, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        debug!(%s, "OutputFormat::from_str: called");
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("Unknown format '{other}' (expected text or json)")),
        }
    }
}

/// Render an itinerary for the terminal
pub fn render_text(itinerary: &Itinerary) -> String {
    let mut out = String::new();
    out.push_str(&format!("Itinerary {} ({})\n", itinerary.id, itinerary.city));
    out.push_str(&format!("  \"{}\"\n\n", itinerary.query));

    for (i, stop) in itinerary.stops.iter().enumerate() {
        let rating = stop
            .primary
            .rating
            .map(|r| format!(" ({r:.1}\u{2605})"))
            .unwrap_or_default();
        out.push_str(&format!(
            "  {} \u{2014} {}: {}{}\n",
            stop.time, stop.activity, stop.primary.name, rating
        ));
        out.push_str(&format!("      {}\n", stop.primary.address));
        for alt in &stop.alternatives {
            let reason = alt.reason.as_deref().unwrap_or("alternative");
            out.push_str(&format!("      alt: {} \u{2013} {}\n", alt.name, reason));
        }
        if let Some(segment) = itinerary.travel.get(i) {
            out.push_str(&format!("      \u{2193} ~{} min to {}\n", segment.duration_min, segment.to));
        }
    }

    for gap in &itinerary.unresolved {
        out.push_str(&format!(
            "  ! could not find a match for \"{}\" in {} ({})\n",
            gap.activity, gap.location, gap.reason
        ));
    }
    out
}

/// Render an itinerary as pretty JSON
pub fn render_json(itinerary: &Itinerary) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(itinerary)
}

/// Render the supported-city table
pub fn render_cities() -> String {
    let mut out = String::from("Supported cities:\n");
    for id in gazetteer::city_ids() {
        if let Some(city) = gazetteer::city(id) {
            out.push_str(&format!("  {:8} {} ({})\n", city.id, city.name, city.timezone));
        }
    }
    out
}
