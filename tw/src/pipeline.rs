//! Planning pipeline: query in, persisted itinerary out
//!
//! Interpret the free-text query, dedupe into ordered time blocks,
//! resolve venues for all blocks concurrently, stitch travel segments
//! between consecutive primaries, then assemble and persist. A block
//! that fails or times out becomes an unresolved entry; it never sinks
//! the plan.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::config::PipelineConfig;
use crate::dedupe::ActivityDeduplicator;
use crate::domain::{Itinerary, ItineraryStop, PlanRequest, ResolvedVenue, TimeBlock, UnresolvedBlock};
use crate::error::PlanError;
use crate::interpret::{interpret_with_fallback, AiInterpreter, HeuristicInterpreter};
use crate::location::gazetteer;
use crate::travel;
use crate::venue::{VenueChoice, VenueResolver};
use planstore::Store;

pub struct Planner {
    ai: Option<AiInterpreter>,
    heuristic: HeuristicInterpreter,
    dedupe: ActivityDeduplicator,
    venues: Arc<VenueResolver>,
    store: Arc<dyn Store<Itinerary>>,
    config: PipelineConfig,
}

impl Planner {
    pub fn new(
        ai: Option<AiInterpreter>,
        dedupe: ActivityDeduplicator,
        venues: Arc<VenueResolver>,
        store: Arc<dyn Store<Itinerary>>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            ai,
            heuristic: HeuristicInterpreter::new(),
            dedupe,
            venues,
            store,
            config,
        }
    }

    /// Run the full pipeline for one request
    pub async fn plan(&self, request: PlanRequest) -> Result<Itinerary, PlanError> {
        let started = Instant::now();
        info!(query = %request.query, city = %request.city, "plan: called");

        let city = gazetteer::city(&request.city).ok_or_else(|| PlanError::UnknownCity(request.city.clone()))?;

        let intents = interpret_with_fallback(self.ai.as_ref(), &self.heuristic, &request).await;
        let blocks = self.dedupe.dedupe(intents, &request, city).await;
        if blocks.is_empty() {
            return Err(PlanError::NoBlocks);
        }
        debug!(blocks = blocks.len(), "plan: time blocks ready");

        let results = self.resolve_all(&blocks, city).await;

        let mut stops = Vec::new();
        let mut unresolved = Vec::new();
        for (block, result) in blocks.iter().zip(results) {
            match result {
                Ok(choice) => stops.push(ItineraryStop {
                    activity: block.search_term.clone(),
                    time: block.time.display.clone(),
                    primary: choice.primary,
                    alternatives: choice.alternatives,
                }),
                Err(reason) => {
                    warn!(activity = %block.search_term, %reason, "plan: block unresolved");
                    unresolved.push(UnresolvedBlock {
                        activity: block.search_term.clone(),
                        location: block.location.name.clone(),
                        reason,
                    });
                }
            }
        }

        let primaries: Vec<&ResolvedVenue> = stops.iter().map(|s| &s.primary).collect();
        let segments = travel::stitch(&primaries, self.config.default_travel_min);

        let itinerary = Itinerary::new(request.query, city.id, stops, segments, unresolved);
        self.store.create(itinerary.clone())?;

        info!(
            id = %itinerary.id,
            stops = itinerary.stops.len(),
            unresolved = itinerary.unresolved.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "plan: done"
        );
        Ok(itinerary)
    }

    /// Resolve every block concurrently, preserving block order
    ///
    /// Each task gets its own timeout; a request-level deadline caps
    /// the whole batch. Blocks still outstanding at the deadline are
    /// aborted and reported as unresolved.
    async fn resolve_all(&self, blocks: &[TimeBlock], city: &'static gazetteer::CityContext) -> Vec<Result<VenueChoice, String>> {
        let per_block = Duration::from_millis(self.config.venue_timeout_ms);
        let deadline = tokio::time::Instant::now() + Duration::from_millis(self.config.request_timeout_ms);

        let mut set = JoinSet::new();
        for (index, block) in blocks.iter().cloned().enumerate() {
            let venues = Arc::clone(&self.venues);
            set.spawn(async move {
                let outcome = tokio::time::timeout(per_block, venues.resolve(&block, city)).await;
                (index, outcome)
            });
        }

        let mut results: Vec<Result<VenueChoice, String>> =
            (0..blocks.len()).map(|_| Err("request deadline reached".to_string())).collect();

        loop {
            let joined = match tokio::time::timeout_at(deadline, set.join_next()).await {
                Ok(joined) => joined,
                Err(_) => {
                    warn!(outstanding = set.len(), "resolve_all: request deadline reached");
                    set.abort_all();
                    break;
                }
            };
            let Some(joined) = joined else {
                break;
            };
            match joined {
                Ok((index, Ok(Ok(choice)))) => results[index] = Ok(choice),
                Ok((index, Ok(Err(e)))) => results[index] = Err(e.to_string()),
                Ok((index, Err(_elapsed))) => {
                    results[index] = Err("venue search timed out".to_string());
                }
                Err(join_err) => warn!(error = %join_err, "resolve_all: venue task panicked"),
            }
        }
        results
    }

    /// Fetch a stored itinerary by id
    pub fn get_itinerary(&self, id: &str) -> Result<Itinerary, PlanError> {
        Ok(self.store.get(id)?)
    }

    /// Delete a stored itinerary
    pub fn delete_itinerary(&self, id: &str) -> Result<(), PlanError> {
        Ok(self.store.delete(id)?)
    }

    /// List stored itinerary ids in creation order
    pub fn list_itineraries(&self) -> Result<Vec<String>, PlanError> {
        Ok(self.store.list()?)
    }
}
