//! Capability traits at the session's collaborator seams.
//!
//! The session never talks to `reqwest` types directly; it sees these
//! narrow traits, with failures collapsed into [`CollaboratorError`] so the
//! orchestrator only has to distinguish "back off" from "did not work".

use async_trait::async_trait;
use thiserror::Error;
use tokio::time::Instant;

use wayplan_core::{ResolvedPlace, Suggestion};
use wayplan_geocode::Viewbox;
use wayplan_routing::{DrivablePath, Location, OptimizedRoute};

/// How a collaborator call failed, as far as the session cares.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollaboratorError {
    /// HTTP 429 or equivalent; retrying immediately would make it worse.
    #[error("rate limited (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    /// Anything else: network failure, bad response, service error.
    #[error("{0}")]
    Failed(String),
}

impl CollaboratorError {
    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }
}

/// Free-text place search, optionally biased to a viewbox.
#[async_trait]
pub trait PlaceSearch: Send + Sync {
    async fn search(
        &self,
        query: &str,
        limit: u32,
        viewbox: Option<Viewbox>,
    ) -> Result<Vec<Suggestion>, CollaboratorError>;
}

/// Coordinate-to-place lookups: nearby POIs and reverse geocoding.
#[async_trait]
pub trait PlaceLookup: Send + Sync {
    async fn nearby(
        &self,
        lat: f64,
        lng: f64,
        radius_m: u32,
    ) -> Result<Vec<ResolvedPlace>, CollaboratorError>;

    async fn reverse(&self, lat: f64, lng: f64)
        -> Result<Option<Suggestion>, CollaboratorError>;
}

/// The external optimizer backend.
#[async_trait]
pub trait RouteOptimizer: Send + Sync {
    async fn optimize(
        &self,
        locations: &[Location],
        priority: &[usize],
    ) -> Result<OptimizedRoute, CollaboratorError>;

    async fn distance_matrix(
        &self,
        locations: &[Location],
    ) -> Result<Vec<Vec<f64>>, CollaboratorError>;
}

/// The drivable-path service.
#[async_trait]
pub trait PathFetcher: Send + Sync {
    async fn route(&self, points: &[Location]) -> Result<DrivablePath, CollaboratorError>;
}

/// Device geolocation, abstracted so tests (and headless hosts) can supply
/// a fixed position or none at all.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current_position(&self) -> Result<(f64, f64), CollaboratorError>;
}

/// Time source for advisory expiry.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Default clock backed by `tokio::time`, which respects paused time in
/// tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioClock;

impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}
