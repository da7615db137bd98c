//! Clients for the route-optimization and drivable-path collaborators.
//!
//! The optimizer backend exposes `POST /optimize-route` and
//! `POST /distance-matrix`; the path service is an OSRM-style
//! `/route/v1/driving/{coordinates}` endpoint. Both clients distinguish
//! HTTP 429 ([`RoutingError::RateLimited`]) from generic failure so the
//! session can raise the right advisory. [`haversine`] provides the
//! straight-line fallback matrix used when the matrix collaborator is
//! unreachable.

pub mod error;
pub mod haversine;
pub mod optimizer;
pub mod path;
pub mod types;

pub use error::RoutingError;
pub use haversine::{haversine_distance_m, straight_line_matrix};
pub use optimizer::OptimizerClient;
pub use path::PathClient;
pub use types::{DrivablePath, Location, OptimizedRoute};
