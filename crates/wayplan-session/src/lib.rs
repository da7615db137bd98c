//! The route planning session orchestrator.
//!
//! Owns the ordered stop list and coordinates the overlapping async flows
//! around it: debounced place search, map-click place resolution, the
//! optimize-then-fetch-path pipeline, distance previews, single-slot undo,
//! and durable saved routes / recent searches.
//!
//! Two disciplines keep the state race-free under overlapping requests:
//!
//! * **Staleness tagging** — every search invocation and pipeline run
//!   carries a monotonically increasing counter; a result is applied only if
//!   no newer invocation of the same concern has been issued (and, for
//!   search, none accepted). Late responses to superseded requests are
//!   discarded, never rendered.
//! * **Typed failure, never panic** — collaborator failures become
//!   [`CollaboratorError`] values that translate into auto-expiring
//!   advisories; the worst outcome of any operation is "state remains as it
//!   was".
//!
//! Collaborators (geocoder, POI interpreter, optimizer, path service,
//! geolocation, storage, clock) are injected through the traits in
//! [`traits`], so the whole session is deterministic under test.

pub mod adapters;
pub mod advisory;
pub mod export;
pub mod persist;
pub mod pipeline;
pub mod preview;
pub mod resolve;
pub mod search;
pub mod session;
pub mod stops;
pub mod traits;
pub mod undo;

pub use adapters::{http_collaborators, FixedLocation, PlaceDirectory, UnavailableLocation};
pub use advisory::Advisories;
pub use persist::{
    JsonFileStore, KeyValueStore, MemoryStore, SessionStorage, StorageError, RECENTS_KEY,
    SAVED_ROUTES_KEY,
};
pub use pipeline::{PipelineResult, RoutePipeline};
pub use preview::{DistancePreview, PreviewOutcome};
pub use resolve::PlaceResolver;
pub use search::{SearchEngine, SearchOutcome};
pub use session::{Collaborators, MapCenter, RouteOutcome, Session};
pub use stops::{StopStore, UpdateStop};
pub use traits::{
    Clock, CollaboratorError, LocationProvider, PathFetcher, PlaceLookup, PlaceSearch,
    RouteOptimizer, TokioClock,
};
pub use undo::{UndoEntry, UndoKind, UndoLedger};
