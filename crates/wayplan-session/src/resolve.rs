//! Resolving a map coordinate into something worth showing.
//!
//! Nearby POIs first; when none exist, the exact point is reverse-geocoded
//! into a single address item. "No information" is a valid, renderable
//! outcome — this service never errors.

use std::sync::Arc;

use wayplan_core::ResolvedPlace;

use crate::traits::PlaceLookup;

pub struct PlaceResolver {
    lookup: Arc<dyn PlaceLookup>,
    radius_m: u32,
}

impl PlaceResolver {
    #[must_use]
    pub fn new(lookup: Arc<dyn PlaceLookup>, radius_m: u32) -> Self {
        Self { lookup, radius_m }
    }

    /// Resolves a coordinate to a list of selectable places.
    ///
    /// Has no side effect on session state; the caller decides whether an
    /// item becomes a stop.
    pub async fn resolve(&self, lat: f64, lng: f64) -> Vec<ResolvedPlace> {
        match self.lookup.nearby(lat, lng, self.radius_m).await {
            Ok(places) if !places.is_empty() => return places,
            Ok(_) => {}
            Err(err) => {
                tracing::debug!(%err, "nearby POI lookup failed, falling back to reverse geocode");
            }
        }

        match self.lookup.reverse(lat, lng).await {
            Ok(Some(suggestion)) => {
                let (title, address) = suggestion.title_and_address();
                vec![ResolvedPlace {
                    name: title.to_string(),
                    subtitle: (!address.is_empty()).then(|| address.to_string()),
                    lat: suggestion.lat,
                    lng: suggestion.lng,
                }]
            }
            Ok(None) => Vec::new(),
            Err(err) => {
                tracing::debug!(%err, "reverse geocode failed, resolving to nothing");
                Vec::new()
            }
        }
    }
}
