//! The session orchestrator: the single owner of planning state.
//!
//! Wires the stop store, search engine, resolver, pipeline, preview, undo
//! ledger, advisories, and storage together behind the operations a UI
//! calls. Every operation either succeeds or degrades to an advisory with
//! prior state retained; nothing here returns a fatal error.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use uuid::Uuid;

use wayplan_core::{
    AppConfig, RecentSearch, ResolvedPlace, RouteSummary, SavedRoute, Stop, StopId, Suggestion,
    ValidationError,
};
use wayplan_geocode::Viewbox;

use crate::advisory::Advisories;
use crate::persist::{KeyValueStore, SessionStorage};
use crate::pipeline::{PipelineResult, RoutePipeline};
use crate::preview::{DistancePreview, PreviewOutcome};
use crate::resolve::PlaceResolver;
use crate::search::{SearchEngine, SearchOutcome};
use crate::stops::{StopStore, UpdateStop};
use crate::traits::{
    Clock, LocationProvider, PathFetcher, PlaceLookup, PlaceSearch, RouteOptimizer,
};
use crate::undo::{UndoKind, UndoLedger};
use crate::{export, traits::CollaboratorError};

/// Name used for the stop created from device geolocation.
const CURRENT_LOCATION_NAME: &str = "Current Location";

/// The injected collaborator set.
pub struct Collaborators {
    pub places: Arc<dyn PlaceSearch>,
    pub lookup: Arc<dyn PlaceLookup>,
    pub optimizer: Arc<dyn RouteOptimizer>,
    pub paths: Arc<dyn PathFetcher>,
    pub location: Arc<dyn LocationProvider>,
}

/// A "center the map here" intent, returned to the caller to act on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapCenter {
    pub lat: f64,
    pub lng: f64,
}

/// What a route computation did to session state.
#[derive(Debug)]
pub enum RouteOutcome {
    /// Fewer than two stops; nothing happened.
    NotEnoughStops,
    /// A complete result was applied.
    Computed(RouteSummary),
    /// Order and distance were applied without a drawable path.
    Partial(RouteSummary),
    /// The optimizer failed; the previous result is untouched.
    Failed,
    /// A newer computation superseded this one; nothing was applied.
    Superseded,
}

pub struct Session {
    stops: Mutex<StopStore>,
    undo: Mutex<UndoLedger>,
    search: SearchEngine,
    places: Arc<dyn PlaceSearch>,
    resolver: PlaceResolver,
    pipeline: RoutePipeline,
    preview: DistancePreview,
    storage: SessionStorage,
    advisories: Advisories,
    location: Arc<dyn LocationProvider>,
    pipeline_gen: AtomicU64,
    route: Mutex<Option<RouteSummary>>,
    preview_km: Mutex<Option<(f64, bool)>>,
    suggestions: Mutex<Vec<Suggestion>>,
    stop_soft_cap: usize,
}

impl Session {
    #[must_use]
    pub fn new(
        config: &AppConfig,
        collaborators: Collaborators,
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
    ) -> Arc<Self> {
        let debounce = Duration::from_millis(config.search_debounce_ms);
        Arc::new(Self {
            stops: Mutex::new(StopStore::new()),
            undo: Mutex::new(UndoLedger::default()),
            search: SearchEngine::new(collaborators.places.clone(), debounce, config.search_limit),
            places: collaborators.places,
            resolver: PlaceResolver::new(collaborators.lookup, config.poi_radius_m),
            pipeline: RoutePipeline::new(collaborators.optimizer.clone(), collaborators.paths),
            preview: DistancePreview::new(collaborators.optimizer, debounce),
            storage: SessionStorage::new(store, config.recents_cap),
            advisories: Advisories::new(clock, Duration::from_secs(config.advisory_ttl_secs)),
            location: collaborators.location,
            pipeline_gen: AtomicU64::new(0),
            route: Mutex::new(None),
            preview_km: Mutex::new(None),
            suggestions: Mutex::new(Vec::new()),
            stop_soft_cap: config.stop_soft_cap,
        })
    }

    // ---- stop list mutations ------------------------------------------

    /// Adds a stop at the end of the list.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] with the list unchanged when the
    /// coordinates or name are rejected.
    pub fn add_stop(
        self: &Arc<Self>,
        name: &str,
        lat: f64,
        lng: f64,
    ) -> Result<StopId, ValidationError> {
        let (id, len) = {
            let mut stops = self.lock_stops();
            let id = stops.add(name, lat, lng)?;
            let len = stops.len();
            if let Some(stop) = stops.get(id).cloned() {
                self.lock_undo().record(UndoKind::Add, stop, len - 1);
            }
            (id, len)
        };
        if len > self.stop_soft_cap {
            self.advisories
                .raise("Large stop lists may take a while to optimize.");
        }
        self.schedule_preview();
        Ok(id)
    }

    /// Makes (or replaces) the route's starting stop.
    ///
    /// # Errors
    ///
    /// Same validation as [`Session::add_stop`].
    pub fn set_start(
        self: &Arc<Self>,
        name: &str,
        lat: f64,
        lng: f64,
    ) -> Result<StopId, ValidationError> {
        let id = {
            let mut stops = self.lock_stops();
            let was_empty = stops.is_empty();
            let id = stops.set_start(name, lat, lng)?;
            // Only an actual insertion is undo-eligible; replacing the
            // existing start edits a stop in place.
            if was_empty {
                if let Some(stop) = stops.get(id).cloned() {
                    self.lock_undo().record(UndoKind::Add, stop, 0);
                }
            }
            id
        };
        self.schedule_preview();
        Ok(id)
    }

    /// Geocodes a free-text address and appends the first hit as a stop.
    ///
    /// This is an explicit one-shot action, so it bypasses the keystroke
    /// debounce. Nothing found, or a collaborator failure, raises an
    /// advisory and leaves the list unchanged.
    pub async fn add_stop_by_address(self: &Arc<Self>, address: &str) -> Option<StopId> {
        let address = address.trim();
        if address.is_empty() {
            return None;
        }
        let hits = match self.places.search(address, 1, None).await {
            Ok(hits) => hits,
            Err(err) => {
                self.advisories.raise(search_failure_text(&err));
                return None;
            }
        };
        let Some(hit) = hits.first() else {
            self.advisories
                .raise(format!("No match found for \"{address}\"."));
            return None;
        };
        let (title, _) = hit.title_and_address();
        match self.add_stop(title, hit.lat, hit.lng) {
            Ok(id) => Some(id),
            Err(err) => {
                self.advisories.raise(err.to_string());
                None
            }
        }
    }

    /// Adds a stop at the device's current position. Failure to obtain a
    /// position raises an advisory and leaves the list unchanged.
    pub async fn add_current_location(self: &Arc<Self>) -> Option<StopId> {
        match self.location.current_position().await {
            Ok((lat, lng)) => match self.add_stop(CURRENT_LOCATION_NAME, lat, lng) {
                Ok(id) => Some(id),
                Err(err) => {
                    self.advisories.raise(err.to_string());
                    None
                }
            },
            Err(err) => {
                tracing::debug!(%err, "geolocation unavailable");
                self.advisories
                    .raise("Could not determine your current location.");
                None
            }
        }
    }

    /// Removes a stop; unknown ids are a no-op.
    pub fn remove_stop(self: &Arc<Self>, id: StopId) {
        let removed = self.lock_stops().remove(id);
        if let Some((index, stop)) = removed {
            self.lock_undo().record(UndoKind::Remove, stop, index);
            self.schedule_preview();
        }
    }

    /// Moves the stop at `from` to position `to`. Out-of-range indices are
    /// a no-op.
    pub fn reorder_stops(self: &Arc<Self>, from: usize, to: usize) {
        self.lock_stops().reorder(from, to);
        self.schedule_preview();
    }

    pub fn toggle_priority(&self, id: StopId) {
        self.lock_stops().toggle_priority(id);
    }

    /// Renames a stop in place.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] for an empty or duplicate name; a
    /// missing id is a silent no-op.
    pub fn rename_stop(&self, id: StopId, name: &str) -> Result<(), ValidationError> {
        self.lock_stops().update(
            id,
            UpdateStop {
                name: Some(name.to_string()),
                ..UpdateStop::default()
            },
        )
    }

    /// Moves a stop to new coordinates (map drag).
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] for non-finite or out-of-range
    /// coordinates; a missing id is a silent no-op.
    pub fn move_stop(self: &Arc<Self>, id: StopId, lat: f64, lng: f64) -> Result<(), ValidationError> {
        self.lock_stops().update(
            id,
            UpdateStop {
                lat: Some(lat),
                lng: Some(lng),
                ..UpdateStop::default()
            },
        )?;
        self.schedule_preview();
        Ok(())
    }

    /// Reverses the last recorded add or remove, then clears the slot.
    /// With an empty slot this is a no-op.
    pub fn undo(self: &Arc<Self>) {
        let entry = self.lock_undo().take();
        let Some(entry) = entry else { return };
        {
            let mut stops = self.lock_stops();
            match entry.kind {
                UndoKind::Add => {
                    stops.remove(entry.stop.id);
                }
                UndoKind::Remove => {
                    stops.insert_at(entry.index, entry.stop);
                }
            }
        }
        self.schedule_preview();
    }

    #[must_use]
    pub fn stops(&self) -> Vec<Stop> {
        self.lock_stops().list()
    }

    // ---- search and place resolution ----------------------------------

    /// Feeds one edit of the search box through the debounced engine and
    /// returns the suggestion list to render.
    pub async fn search_input(&self, query: &str, viewbox: Option<Viewbox>) -> Vec<Suggestion> {
        match self.search.search(query, viewbox).await {
            SearchOutcome::Suggestions(suggestions) => {
                *self.lock_suggestions() = suggestions.clone();
                suggestions
            }
            SearchOutcome::Superseded => self.lock_suggestions().clone(),
            SearchOutcome::Failed(err) => {
                self.advisories.raise(search_failure_text(&err));
                self.lock_suggestions().clear();
                Vec::new()
            }
        }
    }

    /// Marks a suggestion as chosen: records it as a recent search, clears
    /// the suggestion list, and returns the point to center the map on.
    /// The suggestion does not become a stop until the caller adds it.
    pub fn select_suggestion(&self, suggestion: &Suggestion) -> MapCenter {
        let (title, _) = suggestion.title_and_address();
        self.storage.push_recent(RecentSearch {
            name: title.to_string(),
            lat: suggestion.lat,
            lng: suggestion.lng,
        });
        self.lock_suggestions().clear();
        MapCenter {
            lat: suggestion.lat,
            lng: suggestion.lng,
        }
    }

    #[must_use]
    pub fn suggestions(&self) -> Vec<Suggestion> {
        self.lock_suggestions().clone()
    }

    /// Resolves a map click into selectable places. Never fails; "no
    /// information" is an empty list.
    pub async fn resolve_point(&self, lat: f64, lng: f64) -> Vec<ResolvedPlace> {
        self.resolver.resolve(lat, lng).await
    }

    // ---- route computation --------------------------------------------

    /// Runs the optimize-then-path pipeline over the current stop list.
    ///
    /// Tagged with a generation counter: if another computation starts (or
    /// the result has been applied by a newer run) before this one
    /// resolves, the late result is discarded.
    pub async fn compute_route(&self) -> RouteOutcome {
        let generation = self.pipeline_gen.fetch_add(1, Ordering::SeqCst) + 1;
        let (snapshot, priority) = {
            let stops = self.lock_stops();
            (stops.list(), stops.priority_indices())
        };

        let result = self.pipeline.run(&snapshot, &priority).await;

        if self.pipeline_gen.load(Ordering::SeqCst) != generation {
            tracing::debug!(generation, "discarding stale route computation");
            return RouteOutcome::Superseded;
        }

        match result {
            PipelineResult::TooFewStops => RouteOutcome::NotEnoughStops,
            PipelineResult::Complete(summary) => {
                *self.lock_route() = Some(summary.clone());
                RouteOutcome::Computed(summary)
            }
            PipelineResult::PartialPath { summary, failure } => {
                self.advisories.raise(path_failure_text(&failure));
                *self.lock_route() = Some(summary.clone());
                RouteOutcome::Partial(summary)
            }
            PipelineResult::OptimizationFailed(err) => {
                self.advisories.raise(optimize_failure_text(&err));
                RouteOutcome::Failed
            }
        }
    }

    #[must_use]
    pub fn route(&self) -> Option<RouteSummary> {
        self.lock_route().clone()
    }

    /// The current distance preview in kilometers, with a flag marking a
    /// straight-line estimate.
    #[must_use]
    pub fn preview_km(&self) -> Option<(f64, bool)> {
        *self
            .preview_km
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Refreshes the distance preview for the current stop list. Spawned
    /// automatically after every mutation; callable directly by hosts
    /// without a background runtime.
    pub async fn refresh_preview(&self) {
        let snapshot = self.lock_stops().list();
        match self.preview.refresh(&snapshot).await {
            PreviewOutcome::Cleared => {
                *self
                    .preview_km
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner) = None;
            }
            PreviewOutcome::Updated { total_km, estimated } => {
                *self
                    .preview_km
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner) = Some((total_km, estimated));
            }
            PreviewOutcome::RateLimited { retry_after_secs } => {
                self.advisories.raise(format!(
                    "Distance service is rate limiting; retry in about {retry_after_secs}s."
                ));
            }
            PreviewOutcome::Superseded => {}
        }
    }

    // ---- persistence --------------------------------------------------

    /// Saves the current stop list under `name` (blank names get a
    /// timestamped default).
    #[must_use]
    pub fn save_route(&self, name: &str) -> SavedRoute {
        self.storage.save_route(name, self.lock_stops().list())
    }

    /// Replaces the current stop list with a saved route. Returns false
    /// when the id is unknown, with state untouched.
    pub fn load_route(self: &Arc<Self>, id: Uuid) -> bool {
        let Some(saved) = self.storage.find_route(id) else {
            return false;
        };
        self.lock_stops().replace_all(saved.stops);
        self.lock_undo().clear();
        *self.lock_route() = None;
        self.schedule_preview();
        true
    }

    pub fn delete_route(&self, id: Uuid) {
        self.storage.delete_route(id);
    }

    #[must_use]
    pub fn saved_routes(&self) -> Vec<SavedRoute> {
        self.storage.saved_routes()
    }

    #[must_use]
    pub fn recents(&self) -> Vec<RecentSearch> {
        self.storage.recents()
    }

    // ---- export -------------------------------------------------------

    /// A directions deep link over the effective visiting order: the last
    /// computed order when one exists, the list order otherwise.
    #[must_use]
    pub fn export_directions_url(&self) -> Option<String> {
        export::directions_url(&self.ordered_stops())
    }

    /// The stop list as a JSON document, in effective visiting order.
    #[must_use]
    pub fn export_json(&self) -> String {
        export::route_document(&self.ordered_stops())
    }

    /// Current advisory text, if one is up and unexpired.
    #[must_use]
    pub fn advisory(&self) -> Option<String> {
        self.advisories.current()
    }

    fn ordered_stops(&self) -> Vec<Stop> {
        let stops = self.lock_stops().list();
        let order = self.lock_route().as_ref().map(|r| r.order.clone());
        match order {
            // An order from a previous computation only applies while the
            // list it was computed over is still the same length.
            Some(order) if order.len() == stops.len() => {
                order.into_iter().map(|i| stops[i].clone()).collect()
            }
            _ => stops,
        }
    }

    fn schedule_preview(self: &Arc<Self>) {
        // Mutators are callable from synchronous code; without a runtime
        // the background refresh is skipped, not panicked over.
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::debug!("no async runtime, skipping preview refresh");
            return;
        };
        let session = Arc::clone(self);
        handle.spawn(async move {
            session.refresh_preview().await;
        });
    }

    fn lock_stops(&self) -> std::sync::MutexGuard<'_, StopStore> {
        self.stops.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_undo(&self) -> std::sync::MutexGuard<'_, UndoLedger> {
        self.undo.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_route(&self) -> std::sync::MutexGuard<'_, Option<RouteSummary>> {
        self.route.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_suggestions(&self) -> std::sync::MutexGuard<'_, Vec<Suggestion>> {
        self.suggestions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

fn search_failure_text(err: &CollaboratorError) -> String {
    if let CollaboratorError::RateLimited { retry_after_secs } = err {
        format!("Search is rate limited; try again in about {retry_after_secs}s.")
    } else {
        "Search failed; check your connection and try again.".to_string()
    }
}

fn optimize_failure_text(err: &CollaboratorError) -> String {
    if let CollaboratorError::RateLimited { retry_after_secs } = err {
        format!(
            "Optimizer is rate limiting; retry in about {retry_after_secs}s or point at a self-hosted instance."
        )
    } else {
        "Could not compute an optimized route; previous order retained.".to_string()
    }
}

fn path_failure_text(err: &CollaboratorError) -> String {
    if let CollaboratorError::RateLimited { retry_after_secs } = err {
        format!(
            "Path service is rate limiting; retry in about {retry_after_secs}s or point at a self-hosted instance."
        )
    } else {
        "Route order updated, but the drivable path could not be drawn.".to_string()
    }
}
