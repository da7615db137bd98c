//! Route export: a Google Maps deep link and a JSON document.

use std::fmt::Write as _;

use wayplan_core::Stop;

/// Builds a Google Maps directions link visiting `stops` in the given
/// order. Returns `None` for fewer than two stops.
#[must_use]
pub fn directions_url(stops: &[Stop]) -> Option<String> {
    if stops.len() < 2 {
        return None;
    }
    let mut url = String::from("https://www.google.com/maps/dir");
    for stop in stops {
        let _ = write!(url, "/{:.6},{:.6}", stop.lat, stop.lng);
    }
    Some(url)
}

/// Serializes `stops` as a pretty-printed JSON document, in visiting
/// order, suitable for hand-off to other tools.
#[must_use]
pub fn route_document(stops: &[Stop]) -> String {
    let doc = serde_json::json!({ "stops": stops });
    serde_json::to_string_pretty(&doc).unwrap_or_else(|_| String::from("{\"stops\":[]}"))
}
