//! Debounced straight-through distance preview.
//!
//! While the user edits the stop list, a rough total for the current order
//! keeps them oriented without running the full pipeline. Uses the same
//! issued/accepted staleness tagging as search: a reorder burst produces
//! one matrix call, and a late response for an older stop list is dropped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use wayplan_core::Stop;
use wayplan_routing::{straight_line_matrix, Location};

use crate::traits::{CollaboratorError, RouteOptimizer};

/// What a preview refresh produced.
#[derive(Debug, Clone, PartialEq)]
pub enum PreviewOutcome {
    /// Fewer than two stops; show no preview.
    Cleared,
    /// A fresh total over consecutive legs in the current order.
    /// `estimated` is set when the matrix collaborator was unreachable and
    /// the legs are straight-line distances instead.
    Updated { total_km: f64, estimated: bool },
    /// The collaborator is rate limiting; keep whatever preview is showing.
    RateLimited { retry_after_secs: u64 },
    /// A newer refresh superseded this one.
    Superseded,
}

pub struct DistancePreview {
    optimizer: Arc<dyn RouteOptimizer>,
    debounce: Duration,
    issued: AtomicU64,
    accepted: AtomicU64,
}

impl DistancePreview {
    #[must_use]
    pub fn new(optimizer: Arc<dyn RouteOptimizer>, debounce: Duration) -> Self {
        Self {
            optimizer,
            debounce,
            issued: AtomicU64::new(0),
            accepted: AtomicU64::new(0),
        }
    }

    /// Refreshes the preview for a snapshot of the stop list.
    pub async fn refresh(&self, stops: &[Stop]) -> PreviewOutcome {
        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;

        if stops.len() < 2 {
            if self.try_accept(seq) {
                return PreviewOutcome::Cleared;
            }
            return PreviewOutcome::Superseded;
        }

        let locations: Vec<Location> = stops
            .iter()
            .map(|s| Location {
                lat: s.lat,
                lng: s.lng,
            })
            .collect();

        tokio::time::sleep(self.debounce).await;
        if self.issued.load(Ordering::SeqCst) != seq {
            return PreviewOutcome::Superseded;
        }

        let (matrix, estimated) = match self.optimizer.distance_matrix(&locations).await {
            Ok(matrix) => (matrix, false),
            Err(CollaboratorError::RateLimited { retry_after_secs }) => {
                if self.try_accept(seq) {
                    return PreviewOutcome::RateLimited { retry_after_secs };
                }
                return PreviewOutcome::Superseded;
            }
            Err(err) => {
                tracing::debug!(%err, "distance matrix unavailable, using straight-line estimate");
                (straight_line_matrix(&locations), true)
            }
        };

        if !self.try_accept(seq) {
            return PreviewOutcome::Superseded;
        }

        let total_m: f64 = (0..locations.len() - 1).map(|i| matrix[i][i + 1]).sum();
        PreviewOutcome::Updated {
            total_km: total_m / 1_000.0,
            estimated,
        }
    }

    fn try_accept(&self, seq: u64) -> bool {
        let mut current = self.accepted.load(Ordering::SeqCst);
        loop {
            if seq <= current {
                return false;
            }
            match self.accepted.compare_exchange(
                current,
                seq,
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => return true,
                Err(actual) => current = actual,
            }
        }
    }
}
