//! The route computation pipeline: visiting order first, drivable path
//! second.
//!
//! Each stage can fail independently. An optimization failure aborts the
//! run with the previous order untouched; a path failure still yields the
//! new order and distance, just without a drawable polyline.

use std::sync::Arc;

use wayplan_core::{RouteSummary, Stop};
use wayplan_routing::{haversine_distance_m, Location};

use crate::traits::{CollaboratorError, PathFetcher, RouteOptimizer};

/// What a pipeline run produced.
#[derive(Debug)]
pub enum PipelineResult {
    /// Fewer than two stops; there is nothing to route.
    TooFewStops,
    /// Both stages succeeded.
    Complete(RouteSummary),
    /// The order (and distance) are good, but the drivable path is not
    /// available. The summary carries an empty polyline.
    PartialPath {
        summary: RouteSummary,
        failure: CollaboratorError,
    },
    /// The optimizer failed; nothing from this run should be applied.
    OptimizationFailed(CollaboratorError),
}

pub struct RoutePipeline {
    optimizer: Arc<dyn RouteOptimizer>,
    paths: Arc<dyn PathFetcher>,
}

impl RoutePipeline {
    #[must_use]
    pub fn new(optimizer: Arc<dyn RouteOptimizer>, paths: Arc<dyn PathFetcher>) -> Self {
        Self { optimizer, paths }
    }

    /// Runs the full pipeline over a snapshot of stops.
    ///
    /// `priority` holds indices into `stops` that must be visited first.
    /// Two stops skip the optimizer entirely; there is only one order.
    pub async fn run(&self, stops: &[Stop], priority: &[usize]) -> PipelineResult {
        if stops.len() < 2 {
            return PipelineResult::TooFewStops;
        }

        let locations: Vec<Location> = stops
            .iter()
            .map(|s| Location {
                lat: s.lat,
                lng: s.lng,
            })
            .collect();

        let (order, optimizer_distance_m) = if stops.len() == 2 {
            (vec![0, 1], None)
        } else {
            match self.optimizer.optimize(&locations, priority).await {
                Ok(optimized) => (optimized.order, Some(optimized.total_distance_m)),
                Err(err) => {
                    tracing::warn!(%err, "route optimization failed");
                    return PipelineResult::OptimizationFailed(err);
                }
            }
        };

        let ordered: Vec<Location> = order.iter().map(|&i| locations[i]).collect();
        match self.paths.route(&ordered).await {
            Ok(path) => PipelineResult::Complete(RouteSummary {
                order,
                total_distance_m: optimizer_distance_m.unwrap_or(path.distance_m),
                total_duration_s: Some(path.duration_s),
                polyline: path.polyline,
            }),
            Err(err) => {
                tracing::warn!(%err, "drivable path fetch failed, keeping order only");
                let total_distance_m =
                    optimizer_distance_m.unwrap_or_else(|| straight_line_total(&ordered));
                PipelineResult::PartialPath {
                    summary: RouteSummary {
                        order,
                        total_distance_m,
                        total_duration_s: None,
                        polyline: Vec::new(),
                    },
                    failure: err,
                }
            }
        }
    }
}

/// Straight-line estimate over consecutive legs, for when both the
/// optimizer distance and the path distance are unavailable.
fn straight_line_total(ordered: &[Location]) -> f64 {
    ordered
        .windows(2)
        .map(|pair| haversine_distance_m(pair[0], pair[1]))
        .sum()
}
