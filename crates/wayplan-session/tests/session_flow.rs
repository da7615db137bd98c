//! End-to-end session behavior against scripted collaborators.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use wayplan_core::{AppConfig, ResolvedPlace, Suggestion};
use wayplan_geocode::Viewbox;
use wayplan_routing::{DrivablePath, Location, OptimizedRoute};
use wayplan_session::{
    Collaborators, CollaboratorError, FixedLocation, MemoryStore, PathFetcher, PlaceLookup,
    PlaceSearch, RouteOptimizer, RouteOutcome, Session, TokioClock,
};

fn test_config() -> AppConfig {
    AppConfig {
        geocoder_url: "http://unused.invalid".to_string(),
        poi_url: "http://unused.invalid".to_string(),
        optimizer_url: "http://unused.invalid".to_string(),
        router_url: "http://unused.invalid".to_string(),
        log_level: "info".to_string(),
        request_timeout_secs: 1,
        user_agent: "wayplan-test/0.1".to_string(),
        search_debounce_ms: 300,
        search_limit: 8,
        advisory_ttl_secs: 3,
        poi_radius_m: 350,
        recents_cap: 5,
        stop_soft_cap: 12,
        storage_path: None,
    }
}

#[derive(Default)]
struct ScriptedSearch {
    suggestions: Vec<Suggestion>,
}

#[async_trait]
impl PlaceSearch for ScriptedSearch {
    async fn search(
        &self,
        _query: &str,
        _limit: u32,
        _viewbox: Option<Viewbox>,
    ) -> Result<Vec<Suggestion>, CollaboratorError> {
        Ok(self.suggestions.clone())
    }
}

#[derive(Default)]
struct NoPlaces;

#[async_trait]
impl PlaceLookup for NoPlaces {
    async fn nearby(
        &self,
        _lat: f64,
        _lng: f64,
        _radius_m: u32,
    ) -> Result<Vec<ResolvedPlace>, CollaboratorError> {
        Ok(Vec::new())
    }

    async fn reverse(&self, _lat: f64, _lng: f64) -> Result<Option<Suggestion>, CollaboratorError> {
        Ok(None)
    }
}

struct ScriptedOptimizer {
    /// One scripted response per call, consumed in order; the last repeats.
    responses: Mutex<Vec<Result<OptimizedRoute, CollaboratorError>>>,
    delay: Duration,
    calls: AtomicUsize,
}

impl ScriptedOptimizer {
    fn always(result: Result<OptimizedRoute, CollaboratorError>) -> Self {
        Self {
            responses: Mutex::new(vec![result]),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    fn sequence(responses: Vec<Result<OptimizedRoute, CollaboratorError>>, delay: Duration) -> Self {
        Self {
            responses: Mutex::new(responses),
            delay,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl RouteOptimizer for ScriptedOptimizer {
    async fn optimize(
        &self,
        _locations: &[Location],
        _priority: &[usize],
    ) -> Result<OptimizedRoute, CollaboratorError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call == 0 && !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let responses = self.responses.lock().unwrap();
        responses[call.min(responses.len() - 1)].clone()
    }

    async fn distance_matrix(
        &self,
        locations: &[Location],
    ) -> Result<Vec<Vec<f64>>, CollaboratorError> {
        Ok(vec![vec![1_000.0; locations.len()]; locations.len()])
    }
}

struct ScriptedPaths {
    result: Result<DrivablePath, CollaboratorError>,
    seen: Mutex<Vec<Vec<Location>>>,
}

impl ScriptedPaths {
    fn always(result: Result<DrivablePath, CollaboratorError>) -> Self {
        Self {
            result,
            seen: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl PathFetcher for ScriptedPaths {
    async fn route(&self, points: &[Location]) -> Result<DrivablePath, CollaboratorError> {
        self.seen.lock().unwrap().push(points.to_vec());
        self.result.clone()
    }
}

fn good_path() -> DrivablePath {
    DrivablePath {
        polyline: vec![(0.0, 0.0), (0.5, 0.5), (1.0, 1.0)],
        duration_s: 900.0,
        distance_m: 8_000.0,
    }
}

fn session_with(
    optimizer: Arc<ScriptedOptimizer>,
    paths: Arc<ScriptedPaths>,
) -> Arc<Session> {
    session_with_places(optimizer, paths, Vec::new())
}

fn session_with_places(
    optimizer: Arc<ScriptedOptimizer>,
    paths: Arc<ScriptedPaths>,
    suggestions: Vec<Suggestion>,
) -> Arc<Session> {
    let collaborators = Collaborators {
        places: Arc::new(ScriptedSearch { suggestions }),
        lookup: Arc::new(NoPlaces),
        optimizer,
        paths,
        location: Arc::new(FixedLocation {
            lat: 37.8044,
            lng: -122.2712,
        }),
    };
    Session::new(
        &test_config(),
        collaborators,
        Arc::new(MemoryStore::default()),
        Arc::new(TokioClock),
    )
}

#[tokio::test(start_paused = true)]
async fn two_stops_skip_optimization_and_fetch_a_direct_path() {
    let optimizer = Arc::new(ScriptedOptimizer::always(Err(CollaboratorError::Failed(
        "must not be called".into(),
    ))));
    let paths = Arc::new(ScriptedPaths::always(Ok(good_path())));
    let session = session_with(optimizer.clone(), paths.clone());

    session.add_stop("A", 0.0, 0.0).unwrap();
    session.add_stop("B", 0.0, 1.0).unwrap();

    let outcome = session.compute_route().await;
    let RouteOutcome::Computed(summary) = outcome else {
        panic!("expected a computed route, got {outcome:?}");
    };
    assert_eq!(summary.order, vec![0, 1]);
    assert_eq!(optimizer.calls.load(Ordering::SeqCst), 0);

    let seen = paths.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert!((seen[0][0].lng - 0.0).abs() < f64::EPSILON);
    assert!((seen[0][1].lng - 1.0).abs() < f64::EPSILON);
}

#[tokio::test(start_paused = true)]
async fn path_failure_keeps_optimized_order_and_distance() {
    let optimizer = Arc::new(ScriptedOptimizer::always(Ok(OptimizedRoute {
        order: vec![4, 2, 0, 1, 3],
        total_distance_m: 21_500.0,
    })));
    let paths = Arc::new(ScriptedPaths::always(Err(CollaboratorError::Failed(
        "router down".into(),
    ))));
    let session = session_with(optimizer, paths);

    for (i, name) in ["A", "B", "C", "D", "E"].iter().enumerate() {
        session.add_stop(name, i as f64, 0.0).unwrap();
    }

    let outcome = session.compute_route().await;
    let RouteOutcome::Partial(summary) = outcome else {
        panic!("expected a partial route, got {outcome:?}");
    };
    assert_eq!(summary.order, vec![4, 2, 0, 1, 3]);
    assert!((summary.total_distance_m - 21_500.0).abs() < f64::EPSILON);
    assert!(summary.polyline.is_empty());
    assert_eq!(summary.total_duration_s, None);

    // The applied result and the advisory both survive.
    assert_eq!(session.route().unwrap().order, vec![4, 2, 0, 1, 3]);
    assert!(session.advisory().is_some());
}

#[tokio::test(start_paused = true)]
async fn stale_route_computation_is_discarded() {
    let optimizer = Arc::new(ScriptedOptimizer::sequence(
        vec![
            Ok(OptimizedRoute {
                order: vec![2, 1, 0],
                total_distance_m: 1.0,
            }),
            Ok(OptimizedRoute {
                order: vec![0, 1, 2],
                total_distance_m: 2.0,
            }),
        ],
        Duration::from_millis(500),
    ));
    let paths = Arc::new(ScriptedPaths::always(Ok(good_path())));
    let session = session_with(optimizer, paths);

    session.add_stop("A", 0.0, 0.0).unwrap();
    session.add_stop("B", 1.0, 0.0).unwrap();
    session.add_stop("C", 2.0, 0.0).unwrap();

    // The first run stalls in the optimizer for 500ms; the second starts
    // 100ms in and finishes first.
    let slow = session.compute_route();
    let fast = async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        session.compute_route().await
    };
    let (slow, fast) = tokio::join!(slow, fast);

    assert!(matches!(slow, RouteOutcome::Superseded));
    let RouteOutcome::Computed(summary) = fast else {
        panic!("expected the newer run to land, got {fast:?}");
    };
    assert_eq!(summary.order, vec![0, 1, 2]);
    assert_eq!(session.route().unwrap().order, vec![0, 1, 2]);
}

#[tokio::test(start_paused = true)]
async fn undo_restores_a_removed_stop_at_its_index_once() {
    let optimizer = Arc::new(ScriptedOptimizer::always(Err(CollaboratorError::Failed(
        "unused".into(),
    ))));
    let paths = Arc::new(ScriptedPaths::always(Err(CollaboratorError::Failed(
        "unused".into(),
    ))));
    let session = session_with(optimizer, paths);

    session.add_stop("A", 0.0, 0.0).unwrap();
    let b = session.add_stop("B", 1.0, 0.0).unwrap();
    session.add_stop("C", 2.0, 0.0).unwrap();

    session.remove_stop(b);
    let names: Vec<_> = session.stops().into_iter().map(|s| s.name).collect();
    assert_eq!(names, vec!["A", "C"]);

    session.undo();
    let stops = session.stops();
    assert_eq!(stops[1].id, b);
    assert_eq!(stops[1].name, "B");

    // The slot is spent; a second undo changes nothing.
    session.undo();
    assert_eq!(session.stops().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn undo_removes_the_last_added_stop() {
    let optimizer = Arc::new(ScriptedOptimizer::always(Err(CollaboratorError::Failed(
        "unused".into(),
    ))));
    let paths = Arc::new(ScriptedPaths::always(Err(CollaboratorError::Failed(
        "unused".into(),
    ))));
    let session = session_with(optimizer, paths);

    session.add_stop("A", 0.0, 0.0).unwrap();
    session.add_stop("B", 1.0, 0.0).unwrap();
    session.undo();

    let names: Vec<_> = session.stops().into_iter().map(|s| s.name).collect();
    assert_eq!(names, vec!["A"]);
}

#[tokio::test(start_paused = true)]
async fn saved_routes_survive_a_delete_of_a_sibling() {
    let optimizer = Arc::new(ScriptedOptimizer::always(Err(CollaboratorError::Failed(
        "unused".into(),
    ))));
    let paths = Arc::new(ScriptedPaths::always(Err(CollaboratorError::Failed(
        "unused".into(),
    ))));
    let session = session_with(optimizer, paths);

    session.add_stop("A", 0.0, 0.0).unwrap();
    let keep = session.save_route("Errands");

    for (i, name) in ["B", "C", "D", "E"].iter().enumerate() {
        session.add_stop(name, 1.0 + i as f64, 0.0).unwrap();
    }
    let doomed = session.save_route("Morning Run");
    assert_eq!(doomed.stops.len(), 5);

    session.delete_route(doomed.id);

    let routes = session.saved_routes();
    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0].id, keep.id);
    assert_eq!(routes[0].name, "Errands");
}

#[tokio::test(start_paused = true)]
async fn loading_a_saved_route_replaces_the_stop_list() {
    let optimizer = Arc::new(ScriptedOptimizer::always(Err(CollaboratorError::Failed(
        "unused".into(),
    ))));
    let paths = Arc::new(ScriptedPaths::always(Err(CollaboratorError::Failed(
        "unused".into(),
    ))));
    let session = session_with(optimizer, paths);

    session.add_stop("A", 0.0, 0.0).unwrap();
    session.add_stop("B", 1.0, 0.0).unwrap();
    let saved = session.save_route("pair");

    session.add_stop("C", 2.0, 0.0).unwrap();
    assert!(session.load_route(saved.id));

    let names: Vec<_> = session.stops().into_iter().map(|s| s.name).collect();
    assert_eq!(names, vec!["A", "B"]);

    // Loading also clears the undo slot; nothing to reverse.
    session.undo();
    assert_eq!(session.stops().len(), 2);

    assert!(!session.load_route(uuid::Uuid::new_v4()));
}

#[tokio::test(start_paused = true)]
async fn selecting_a_suggestion_records_a_recent_and_centers_the_map() {
    let optimizer = Arc::new(ScriptedOptimizer::always(Err(CollaboratorError::Failed(
        "unused".into(),
    ))));
    let paths = Arc::new(ScriptedPaths::always(Err(CollaboratorError::Failed(
        "unused".into(),
    ))));
    let session = session_with(optimizer, paths);

    let suggestion = Suggestion {
        label: "Blue Bottle, 300 Webster St, Oakland".to_string(),
        lat: 37.7955,
        lng: -122.3937,
    };
    let center = session.select_suggestion(&suggestion);
    assert!((center.lat - 37.7955).abs() < f64::EPSILON);

    let recents = session.recents();
    assert_eq!(recents.len(), 1);
    assert_eq!(recents[0].name, "Blue Bottle");
    assert!(session.suggestions().is_empty());
}

#[tokio::test(start_paused = true)]
async fn current_location_becomes_a_named_stop() {
    let optimizer = Arc::new(ScriptedOptimizer::always(Err(CollaboratorError::Failed(
        "unused".into(),
    ))));
    let paths = Arc::new(ScriptedPaths::always(Err(CollaboratorError::Failed(
        "unused".into(),
    ))));
    let session = session_with(optimizer, paths);

    let id = session.add_current_location().await.unwrap();
    let stop = session
        .stops()
        .into_iter()
        .find(|s| s.id == id)
        .unwrap();
    assert_eq!(stop.name, "Current Location");
    assert!((stop.lat - 37.8044).abs() < f64::EPSILON);
}

#[tokio::test(start_paused = true)]
async fn manual_address_adds_the_first_geocoder_hit() {
    let optimizer = Arc::new(ScriptedOptimizer::always(Err(CollaboratorError::Failed(
        "unused".into(),
    ))));
    let paths = Arc::new(ScriptedPaths::always(Err(CollaboratorError::Failed(
        "unused".into(),
    ))));
    let session = session_with_places(
        optimizer,
        paths,
        vec![
            Suggestion {
                label: "Ferry Building, San Francisco, CA".to_string(),
                lat: 37.7955,
                lng: -122.3937,
            },
            Suggestion {
                label: "Ferry Building, Somewhere Else".to_string(),
                lat: 0.0,
                lng: 0.0,
            },
        ],
    );

    let id = session.add_stop_by_address("ferry building").await.unwrap();
    let stops = session.stops();
    assert_eq!(stops.len(), 1);
    assert_eq!(stops[0].id, id);
    assert_eq!(stops[0].name, "Ferry Building");
    assert!((stops[0].lat - 37.7955).abs() < f64::EPSILON);
}

#[tokio::test(start_paused = true)]
async fn manual_address_with_no_match_raises_an_advisory() {
    let optimizer = Arc::new(ScriptedOptimizer::always(Err(CollaboratorError::Failed(
        "unused".into(),
    ))));
    let paths = Arc::new(ScriptedPaths::always(Err(CollaboratorError::Failed(
        "unused".into(),
    ))));
    let session = session_with(optimizer, paths);

    assert!(session.add_stop_by_address("nowhere at all").await.is_none());
    assert!(session.stops().is_empty());
    assert!(session.advisory().is_some());
}

#[test]
fn mutators_work_without_an_async_runtime() {
    let optimizer = Arc::new(ScriptedOptimizer::always(Err(CollaboratorError::Failed(
        "unused".into(),
    ))));
    let paths = Arc::new(ScriptedPaths::always(Err(CollaboratorError::Failed(
        "unused".into(),
    ))));
    let session = session_with(optimizer, paths);

    // The background preview refresh is skipped here, not panicked over.
    let a = session.add_stop("A", 0.0, 0.0).unwrap();
    session.add_stop("B", 1.0, 0.0).unwrap();
    session.reorder_stops(0, 1);
    session.remove_stop(a);
    session.undo();
    assert_eq!(session.stops().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn exports_follow_the_computed_order() {
    let optimizer = Arc::new(ScriptedOptimizer::always(Ok(OptimizedRoute {
        order: vec![2, 0, 1],
        total_distance_m: 5_000.0,
    })));
    let paths = Arc::new(ScriptedPaths::always(Ok(good_path())));
    let session = session_with(optimizer, paths);

    session.add_stop("A", 10.0, 10.0).unwrap();
    session.add_stop("B", 20.0, 20.0).unwrap();
    session.add_stop("C", 30.0, 30.0).unwrap();
    session.compute_route().await;

    let url = session.export_directions_url().unwrap();
    assert_eq!(
        url,
        "https://www.google.com/maps/dir/30.000000,30.000000/10.000000,10.000000/20.000000,20.000000"
    );

    let doc: serde_json::Value = serde_json::from_str(&session.export_json()).unwrap();
    assert_eq!(doc["stops"][0]["name"], "C");
    assert_eq!(doc["stops"][2]["name"], "B");
}
