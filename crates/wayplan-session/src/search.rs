//! Debounced, staleness-protected place search.
//!
//! Each call is tagged with a sequence number from `issued`. The debounce
//! sleep collapses a burst of keystrokes: when the sleep ends, only the call
//! whose tag is still the latest proceeds to the network. A second counter,
//! `accepted`, guards the response side — a result is applied only if no
//! later call has already been accepted, so an out-of-order older response
//! can never replace a newer list.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use wayplan_core::Suggestion;
use wayplan_geocode::Viewbox;

use crate::traits::{CollaboratorError, PlaceSearch};

/// Minimum query length that triggers a collaborator call.
const MIN_QUERY_LEN: usize = 2;

/// What a single `search` invocation produced.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// This invocation is the freshest; render these suggestions.
    Suggestions(Vec<Suggestion>),
    /// A newer invocation superseded this one; render nothing from it.
    Superseded,
    /// The collaborator failed; render an empty list plus an advisory.
    Failed(CollaboratorError),
}

pub struct SearchEngine {
    places: Arc<dyn PlaceSearch>,
    debounce: Duration,
    limit: u32,
    issued: AtomicU64,
    accepted: AtomicU64,
}

impl SearchEngine {
    #[must_use]
    pub fn new(places: Arc<dyn PlaceSearch>, debounce: Duration, limit: u32) -> Self {
        Self {
            places,
            debounce,
            limit,
            issued: AtomicU64::new(0),
            accepted: AtomicU64::new(0),
        }
    }

    /// Runs one debounced search for `query`.
    ///
    /// Queries shorter than two characters short-circuit to an empty
    /// suggestion list without a collaborator call (and still supersede any
    /// in-flight older search, so a cleared input cannot be repopulated by a
    /// late response).
    pub async fn search(&self, query: &str, viewbox: Option<Viewbox>) -> SearchOutcome {
        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let query = query.trim();

        if query.chars().count() < MIN_QUERY_LEN {
            if self.try_accept(seq) {
                return SearchOutcome::Suggestions(Vec::new());
            }
            return SearchOutcome::Superseded;
        }

        tokio::time::sleep(self.debounce).await;
        if self.issued.load(Ordering::SeqCst) != seq {
            // A newer keystroke arrived during the quiet window; this call
            // never reaches the network.
            return SearchOutcome::Superseded;
        }

        match self.places.search(query, self.limit, viewbox).await {
            Ok(suggestions) => {
                if self.try_accept(seq) {
                    SearchOutcome::Suggestions(suggestions)
                } else {
                    tracing::debug!(query, seq, "discarding stale search response");
                    SearchOutcome::Superseded
                }
            }
            Err(err) => {
                if self.try_accept(seq) {
                    SearchOutcome::Failed(err)
                } else {
                    SearchOutcome::Superseded
                }
            }
        }
    }

    /// Marks `seq` as the last accepted invocation unless a newer one has
    /// already been accepted.
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

#[cfg(test)]
#[path = "search_test.rs"]
mod search_test;
