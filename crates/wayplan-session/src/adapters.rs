//! Wires the HTTP clients into the session's collaborator traits.
//!
//! This is the only module that sees both the concrete clients and the
//! traits; everything else in the crate works against the traits alone.
//! Client error taxonomies collapse here into [`CollaboratorError`],
//! preserving only the rate-limit distinction.

use async_trait::async_trait;

use wayplan_core::{AppConfig, ResolvedPlace, Suggestion};
use wayplan_geocode::{GeocodeClient, GeocodeError, PoiClient, Viewbox};
use wayplan_routing::{
    DrivablePath, Location, OptimizedRoute, OptimizerClient, PathClient, RoutingError,
};

use crate::traits::{
    CollaboratorError, LocationProvider, PathFetcher, PlaceLookup, PlaceSearch, RouteOptimizer,
};

impl From<GeocodeError> for CollaboratorError {
    fn from(err: GeocodeError) -> Self {
        match err {
            GeocodeError::RateLimited { retry_after_secs } => {
                Self::RateLimited { retry_after_secs }
            }
            other => Self::Failed(other.to_string()),
        }
    }
}

impl From<RoutingError> for CollaboratorError {
    fn from(err: RoutingError) -> Self {
        match err {
            RoutingError::RateLimited { retry_after_secs } => {
                Self::RateLimited { retry_after_secs }
            }
            other => Self::Failed(other.to_string()),
        }
    }
}

#[async_trait]
impl PlaceSearch for GeocodeClient {
    async fn search(
        &self,
        query: &str,
        limit: u32,
        viewbox: Option<Viewbox>,
    ) -> Result<Vec<Suggestion>, CollaboratorError> {
        Ok(GeocodeClient::search(self, query, limit, viewbox).await?)
    }
}

/// POI lookup with reverse-geocode fallback, as one collaborator.
pub struct PlaceDirectory {
    poi: PoiClient,
    geocoder: GeocodeClient,
}

impl PlaceDirectory {
    #[must_use]
    pub fn new(poi: PoiClient, geocoder: GeocodeClient) -> Self {
        Self { poi, geocoder }
    }
}

#[async_trait]
impl PlaceLookup for PlaceDirectory {
    async fn nearby(
        &self,
        lat: f64,
        lng: f64,
        radius_m: u32,
    ) -> Result<Vec<ResolvedPlace>, CollaboratorError> {
        Ok(self.poi.nearby(lat, lng, radius_m).await?)
    }

    async fn reverse(&self, lat: f64, lng: f64) -> Result<Option<Suggestion>, CollaboratorError> {
        Ok(self.geocoder.reverse(lat, lng).await?)
    }
}

#[async_trait]
impl RouteOptimizer for OptimizerClient {
    async fn optimize(
        &self,
        locations: &[Location],
        priority: &[usize],
    ) -> Result<OptimizedRoute, CollaboratorError> {
        Ok(OptimizerClient::optimize(self, locations, priority).await?)
    }

    async fn distance_matrix(
        &self,
        locations: &[Location],
    ) -> Result<Vec<Vec<f64>>, CollaboratorError> {
        Ok(OptimizerClient::distance_matrix(self, locations).await?)
    }
}

#[async_trait]
impl PathFetcher for PathClient {
    async fn route(&self, points: &[Location]) -> Result<DrivablePath, CollaboratorError> {
        Ok(PathClient::route(self, points).await?)
    }
}

/// A host with no geolocation capability. Every request fails, which the
/// session surfaces as an advisory rather than an error.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableLocation;

#[async_trait]
impl LocationProvider for UnavailableLocation {
    async fn current_position(&self) -> Result<(f64, f64), CollaboratorError> {
        Err(CollaboratorError::Failed(
            "device location is not available".to_string(),
        ))
    }
}

/// A fixed position, for tests and hosts that know where they are.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation {
    pub lat: f64,
    pub lng: f64,
}

#[async_trait]
impl LocationProvider for FixedLocation {
    async fn current_position(&self) -> Result<(f64, f64), CollaboratorError> {
        Ok((self.lat, self.lng))
    }
}

/// Builds the full HTTP collaborator set from configuration.
///
/// # Errors
///
/// Fails when a configured base URL cannot be parsed.
pub fn http_collaborators(
    config: &AppConfig,
) -> Result<crate::session::Collaborators, CollaboratorError> {
    let timeout = config.request_timeout_secs;
    let agent = config.user_agent.as_str();

    let geocoder = GeocodeClient::new(&config.geocoder_url, timeout, agent)
        .map_err(CollaboratorError::from)?;
    let poi = PoiClient::new(&config.poi_url, timeout, agent).map_err(CollaboratorError::from)?;
    let optimizer = OptimizerClient::new(&config.optimizer_url, timeout, agent)
        .map_err(CollaboratorError::from)?;
    let paths =
        PathClient::new(&config.router_url, timeout, agent).map_err(CollaboratorError::from)?;

    Ok(crate::session::Collaborators {
        places: std::sync::Arc::new(geocoder.clone()),
        lookup: std::sync::Arc::new(PlaceDirectory::new(poi, geocoder)),
        optimizer: std::sync::Arc::new(optimizer),
        paths: std::sync::Arc::new(paths),
        location: std::sync::Arc::new(UnavailableLocation),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limits_survive_the_error_collapse() {
        let err: CollaboratorError = GeocodeError::RateLimited {
            retry_after_secs: 17,
        }
        .into();
        assert!(err.is_rate_limited());

        let err: CollaboratorError = RoutingError::Api("boom".to_string()).into();
        assert!(!err.is_rate_limited());
    }

    #[tokio::test]
    async fn fixed_location_reports_its_position() {
        let loc = FixedLocation {
            lat: 37.8,
            lng: -122.27,
        };
        assert_eq!(loc.current_position().await.unwrap(), (37.8, -122.27));
    }

    #[tokio::test]
    async fn unavailable_location_always_fails() {
        assert!(UnavailableLocation.current_position().await.is_err());
    }
}
