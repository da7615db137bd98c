//! Wire shapes for the optimizer backend and the path service.

use serde::{Deserialize, Serialize};

/// A bare coordinate pair as the optimizer backend expects it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Serialize)]
pub(crate) struct OptimizeRequest<'a> {
    pub locations: &'a [Location],
    pub priority: &'a [usize],
}

/// Optimizer response. `total_distance_m` is the canonical field name; the
/// legacy `total_distance` spelling is accepted on deserialization only.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OptimizedRoute {
    pub order: Vec<usize>,
    #[serde(alias = "total_distance")]
    pub total_distance_m: f64,
}

#[derive(Debug, Serialize)]
pub(crate) struct MatrixRequest<'a> {
    pub locations: &'a [Location],
}

#[derive(Debug, Deserialize)]
pub(crate) struct MatrixResponse {
    pub matrix: Vec<Vec<f64>>,
}

/// Result of a path fetch, with the geometry already flipped to lat-first
/// pairs for display.
#[derive(Debug, Clone, PartialEq)]
pub struct DrivablePath {
    pub polyline: Vec<(f64, f64)>,
    pub duration_s: f64,
    pub distance_m: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OsrmResponse {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OsrmRoute {
    pub geometry: OsrmGeometry,
    pub duration: f64,
    pub distance: f64,
}

/// GeoJSON LineString geometry: coordinates arrive lng-first.
#[derive(Debug, Deserialize)]
pub(crate) struct OsrmGeometry {
    pub coordinates: Vec<[f64; 2]>,
}
