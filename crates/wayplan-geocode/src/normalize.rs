//! Normalization from raw collaborator shapes to display-ready domain types.
//!
//! The search service stringifies its coordinate floats and the POI
//! interpreter returns free-form tag maps; both get converted here so the
//! rest of the workspace only ever sees parsed, finite coordinates.

use wayplan_core::{ResolvedPlace, Suggestion};

use crate::types::{OverpassElement, PlaceHit};

/// Tag keys checked, in order, for a POI category to use as the subtitle.
const CATEGORY_TAGS: [&str; 4] = ["amenity", "shop", "tourism", "leisure"];

/// Converts one search hit into a [`Suggestion`], dropping hits whose
/// stringified coordinates do not parse to finite floats.
pub fn suggestion_from_hit(hit: &PlaceHit) -> Option<Suggestion> {
    let lat = hit.lat.parse::<f64>().ok().filter(|v| v.is_finite())?;
    let lng = hit.lon.parse::<f64>().ok().filter(|v| v.is_finite())?;
    Some(Suggestion {
        label: hit.display_name.clone(),
        lat,
        lng,
    })
}

/// Converts a list of search hits, skipping any that fail to parse.
pub fn suggestions_from_hits(hits: Vec<PlaceHit>) -> Vec<Suggestion> {
    hits.iter()
        .filter_map(|hit| {
            let parsed = suggestion_from_hit(hit);
            if parsed.is_none() {
                tracing::debug!(display_name = %hit.display_name, "dropping unparseable place hit");
            }
            parsed
        })
        .collect()
}

/// Converts a POI element into a [`ResolvedPlace`].
///
/// Elements without a `name` tag are dropped; the subtitle is the first
/// category tag present (amenity, shop, tourism, leisure).
pub fn place_from_element(element: &OverpassElement) -> Option<ResolvedPlace> {
    let name = element.tags.get("name")?.clone();
    let subtitle = CATEGORY_TAGS
        .iter()
        .find_map(|key| element.tags.get(*key))
        .map(|v| v.replace('_', " "));
    Some(ResolvedPlace {
        name,
        subtitle,
        lat: element.lat,
        lng: element.lon,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn hit(display_name: &str, lat: &str, lon: &str) -> PlaceHit {
        PlaceHit {
            display_name: display_name.into(),
            lat: lat.into(),
            lon: lon.into(),
        }
    }

    #[test]
    fn parses_stringified_floats() {
        let s = suggestion_from_hit(&hit("Ferry Building", "37.7955", "-122.3937")).unwrap();
        assert_eq!(s.label, "Ferry Building");
        assert!((s.lat - 37.7955).abs() < 1e-9);
        assert!((s.lng + 122.3937).abs() < 1e-9);
    }

    #[test]
    fn drops_unparseable_hits_but_keeps_the_rest() {
        let hits = vec![
            hit("good", "1.0", "2.0"),
            hit("bad", "not-a-float", "2.0"),
            hit("also bad", "1.0", "NaN"),
        ];
        let suggestions = suggestions_from_hits(hits);
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].label, "good");
    }

    #[test]
    fn poi_without_name_is_dropped() {
        let element = OverpassElement {
            lat: 1.0,
            lon: 2.0,
            tags: HashMap::from([("amenity".to_string(), "cafe".to_string())]),
        };
        assert!(place_from_element(&element).is_none());
    }

    #[test]
    fn poi_subtitle_prefers_amenity_and_humanizes_underscores() {
        let element = OverpassElement {
            lat: 1.0,
            lon: 2.0,
            tags: HashMap::from([
                ("name".to_string(), "Corner Store".to_string()),
                ("shop".to_string(), "convenience".to_string()),
                ("amenity".to_string(), "fast_food".to_string()),
            ]),
        };
        let place = place_from_element(&element).unwrap();
        assert_eq!(place.name, "Corner Store");
        assert_eq!(place.subtitle.as_deref(), Some("fast food"));
    }

    #[test]
    fn poi_with_only_name_has_no_subtitle() {
        let element = OverpassElement {
            lat: 1.0,
            lon: 2.0,
            tags: HashMap::from([("name".to_string(), "Obelisk".to_string())]),
        };
        let place = place_from_element(&element).unwrap();
        assert!(place.subtitle.is_none());
    }
}
