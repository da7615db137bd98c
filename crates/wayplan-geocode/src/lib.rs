//! Clients for the place-search, reverse-geocode, and nearby-POI
//! collaborators.
//!
//! Wraps `reqwest` with typed error handling: HTTP 429 surfaces as
//! [`GeocodeError::RateLimited`] so callers can raise a retry-later advisory
//! instead of treating it as a generic failure. All clients take an
//! injectable base URL so tests can point them at a mock server.

pub mod client;
pub mod error;
pub mod normalize;
pub mod poi;
pub mod types;

pub use client::{GeocodeClient, Viewbox};
pub use error::GeocodeError;
pub use poi::PoiClient;
pub use types::{OverpassElement, OverpassResponse, PlaceHit};
