//! TripWeave - turn a free-text day plan into a verified itinerary
//!
//! CLI entry point: loads config, wires the external capabilities, and
//! dispatches subcommands to the planning pipeline.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use clap::Parser;
use eyre::{Context, Result};
use tracing::{debug, warn};

use tripweave::capability::geocode::{Geocoder, HttpGeocoder};
use tripweave::capability::places::{HttpPlacesClient, PlaceSearch};
use tripweave::capability::weather::{CachedWeather, HttpWeatherClient, WeatherForecast};
use tripweave::cli::{render_cities, render_json, render_text, Cli, Command, OutputFormat};
use tripweave::config::Config;
use tripweave::dedupe::ActivityDeduplicator;
use tripweave::domain::{Itinerary, PlanRequest};
use tripweave::interpret::AiInterpreter;
use tripweave::llm::create_client;
use tripweave::location::LocationResolver;
use tripweave::pipeline::Planner;
use tripweave::venue::VenueResolver;

use planstore::{JsonlStore, Store};

fn setup_logging(cli_log_level: Option<&str>) -> Result<()> {
    let level = match cli_log_level.map(str::to_uppercase).as_deref() {
        Some("TRACE") => tracing::Level::TRACE,
        Some("DEBUG") => tracing::Level::DEBUG,
        Some("INFO") | None => tracing::Level::INFO,
        Some("WARN") | Some("WARNING") => tracing::Level::WARN,
        Some("ERROR") => tracing::Level::ERROR,
        Some(other) => {
            eprintln!("Warning: Unknown log-level '{other}', defaulting to INFO");
            tracing::Level::INFO
        }
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Command::Plan {
            query,
            city,
            date,
            start_time,
            format,
        } => cmd_plan(&config, query, city, date, start_time, format).await,
        Command::Show { id, format } => cmd_show(&config, &id, format),
        Command::List => cmd_list(&config),
        Command::Delete { id } => cmd_delete(&config, &id),
        Command::Cities => {
            print!("{}", render_cities());
            Ok(())
        }
    }
}

async fn cmd_plan(
    config: &Config,
    query: String,
    city: String,
    date: Option<String>,
    start_time: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    debug!(%query, %city, "cmd_plan: called");
    config.validate()?;

    let date = date
        .map(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").context(format!("Invalid date '{d}' (expected YYYY-MM-DD)")))
        .transpose()?;

    let planner = build_planner(config)?;
    let request = PlanRequest {
        query,
        date,
        start_time,
        city,
    };

    let itinerary = planner.plan(request).await?;
    print_itinerary(&itinerary, format)
}

fn cmd_show(config: &Config, id: &str, format: OutputFormat) -> Result<()> {
    debug!(%id, "cmd_show: called");
    let store = open_store(config)?;
    let itinerary = store.get(id)?;
    print_itinerary(&itinerary, format)
}

fn cmd_list(config: &Config) -> Result<()> {
    debug!("cmd_list: called");
    let store = open_store(config)?;
    let ids = store.list()?;
    if ids.is_empty() {
        println!("No stored itineraries.");
    }
    for id in ids {
        println!("{id}");
    }
    Ok(())
}

fn cmd_delete(config: &Config, id: &str) -> Result<()> {
    debug!(%id, "cmd_delete: called");
    let store = open_store(config)?;
    store.delete(id)?;
    println!("Deleted {id}");
    Ok(())
}

fn print_itinerary(itinerary: &Itinerary, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print!("{}", render_text(itinerary)),
        OutputFormat::Json => println!("{}", render_json(itinerary)?),
    }
    Ok(())
}

/// Wire capabilities and collaborators into a ready Planner
fn build_planner(config: &Config) -> Result<Planner> {
    let llm = create_client(&config.llm).context("Failed to create LLM client")?;
    let ai = llm.clone().map(AiInterpreter::new);

    let places: Arc<dyn PlaceSearch> =
        Arc::new(HttpPlacesClient::from_config(&config.places).context("Failed to create place search client")?);

    let weather: Arc<dyn WeatherForecast> = match HttpWeatherClient::from_config(&config.weather) {
        Ok(client) => Arc::new(CachedWeather::new(
            Arc::new(client),
            Duration::from_secs(config.weather.cache_ttl_minutes * 60),
        )),
        Err(e) => {
            warn!(error = %e, "build_planner: weather unavailable, outdoor checks disabled");
            Arc::new(CachedWeather::new(
                Arc::new(NoWeather),
                Duration::from_secs(config.weather.cache_ttl_minutes * 60),
            ))
        }
    };

    let geocoder: Option<Arc<dyn Geocoder>> = match HttpGeocoder::from_config(&config.geocode) {
        Ok(g) => Some(Arc::new(g)),
        Err(e) => {
            warn!(error = %e, "build_planner: geocoder unavailable, gazetteer only");
            None
        }
    };

    let dedupe = ActivityDeduplicator::new(
        Arc::new(LocationResolver::new(geocoder)),
        config.pipeline.min_rating,
    );
    let venues = Arc::new(VenueResolver::new(
        places,
        weather,
        llm,
        &config.places,
        &config.pipeline,
    ));
    let store = open_store(config)?;

    Ok(Planner::new(ai, dedupe, venues, Arc::new(store), config.pipeline.clone()))
}

fn open_store(config: &Config) -> Result<JsonlStore<Itinerary>> {
    let data_dir = PathBuf::from(&config.storage.data_dir);
    fs::create_dir_all(&data_dir).context("Failed to create data directory")?;
    let store = JsonlStore::open(data_dir.join("itineraries.jsonl")).context("Failed to open itinerary store")?;
    Ok(store)
}

/// Stand-in forecast source when no weather API key is configured
struct NoWeather;

#[async_trait::async_trait]
impl WeatherForecast for NoWeather {
    async fn forecast(&self, _lat: f64, _lng: f64) -> Result<Vec<tripweave::capability::weather::ForecastEntry>, tripweave::capability::weather::WeatherError> {
        Ok(Vec::new())
    }
}
