//! Wire shapes for the geocoding and POI collaborators.

use std::collections::HashMap;

use serde::Deserialize;

/// One search or reverse-geocode hit. The service stringifies its floats.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaceHit {
    pub display_name: String,
    pub lat: String,
    pub lon: String,
}

#[derive(Debug, Deserialize)]
pub struct OverpassResponse {
    #[serde(default)]
    pub elements: Vec<OverpassElement>,
}

/// A node element from the POI interpreter. Elements without a `name` tag
/// are not useful for display and get dropped during normalization.
#[derive(Debug, Clone, Deserialize)]
pub struct OverpassElement {
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub tags: HashMap<String, String>,
}
