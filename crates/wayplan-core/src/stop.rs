//! Domain types for a route planning session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier for a [`Stop`], stable for the stop's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StopId(Uuid);

impl StopId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for StopId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for StopId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A named geographic point to visit.
///
/// Owned exclusively by the stop store; everything else holds read snapshots
/// plus a [`StopId`] for addressing mutations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub id: StopId,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub is_priority: bool,
}

impl Stop {
    /// Creates a stop with a fresh id and the priority flag cleared.
    #[must_use]
    pub fn new(name: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            id: StopId::new(),
            name: name.into(),
            lat,
            lng,
            is_priority: false,
        }
    }
}

/// One ranked place suggestion produced by a search invocation.
///
/// Ephemeral: the next search supersedes the whole list.
#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    pub label: String,
    pub lat: f64,
    pub lng: f64,
}

impl Suggestion {
    /// Splits the label into a short title and the remaining address text.
    ///
    /// Geocoders return comma-joined display names ("Blue Bottle, 300 Webster
    /// St, Oakland, ..."); the first segment is the human-facing title.
    #[must_use]
    pub fn title_and_address(&self) -> (&str, &str) {
        match self.label.split_once(',') {
            Some((title, rest)) => (title.trim(), rest.trim()),
            None => (self.label.trim(), ""),
        }
    }
}

/// A display/selection item produced by resolving a map coordinate.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPlace {
    pub name: String,
    pub subtitle: Option<String>,
    pub lat: f64,
    pub lng: f64,
}

/// The assembled outcome of a successful (or partially successful) route
/// computation.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteSummary {
    /// Permutation of stop-list indices in visiting order.
    pub order: Vec<usize>,
    pub total_distance_m: f64,
    pub total_duration_s: Option<f64>,
    /// Drawable path as lat-first coordinate pairs; empty when the path
    /// fetch failed or was skipped.
    pub polyline: Vec<(f64, f64)>,
}

/// A durable, explicitly saved snapshot of a stop list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedRoute {
    pub id: Uuid,
    pub name: String,
    pub stops: Vec<Stop>,
    pub created_at: DateTime<Utc>,
}

impl SavedRoute {
    #[must_use]
    pub fn new(name: impl Into<String>, stops: Vec<Stop>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            stops,
            created_at: Utc::now(),
        }
    }
}

/// One entry in the capped, deduplicated list of recent searches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentSearch {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_ids_are_unique() {
        let a = Stop::new("a", 0.0, 0.0);
        let b = Stop::new("b", 0.0, 0.0);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn suggestion_splits_title_and_address() {
        let s = Suggestion {
            label: "Blue Bottle, 300 Webster St, Oakland".into(),
            lat: 37.8,
            lng: -122.27,
        };
        let (title, address) = s.title_and_address();
        assert_eq!(title, "Blue Bottle");
        assert_eq!(address, "300 Webster St, Oakland");
    }

    #[test]
    fn suggestion_without_comma_has_empty_address() {
        let s = Suggestion {
            label: "Oakland".into(),
            lat: 37.8,
            lng: -122.27,
        };
        assert_eq!(s.title_and_address(), ("Oakland", ""));
    }

    #[test]
    fn stop_round_trips_through_json() {
        let stop = Stop::new("Ferry Building", 37.7955, -122.3937);
        let json = serde_json::to_string(&stop).unwrap();
        let back: Stop = serde_json::from_str(&json).unwrap();
        assert_eq!(stop, back);
    }

    #[test]
    fn stop_deserializes_without_priority_field() {
        let json = r#"{"id":"6e9f62b2-18e5-4c3f-9a85-26e58e1b43a0","name":"x","lat":1.0,"lng":2.0}"#;
        let stop: Stop = serde_json::from_str(json).unwrap();
        assert!(!stop.is_priority);
    }
}
