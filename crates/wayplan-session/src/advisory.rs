//! Auto-expiring, user-visible advisory messages.
//!
//! One slot: a new advisory replaces the current one, and reads past the
//! TTL return nothing. Advisories are the only way collaborator failures
//! reach the user; they are informational, never fatal.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

use crate::traits::Clock;

struct Slot {
    text: String,
    expires_at: Instant,
}

pub struct Advisories {
    clock: Arc<dyn Clock>,
    ttl: Duration,
    slot: Mutex<Option<Slot>>,
}

impl Advisories {
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            clock,
            ttl,
            slot: Mutex::new(None),
        }
    }

    /// Raises an advisory with the default TTL, replacing any current one.
    pub fn raise(&self, text: impl Into<String>) {
        let text = text.into();
        tracing::info!(advisory = %text, "raising advisory");
        let expires_at = self.clock.now() + self.ttl;
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(Slot { text, expires_at });
    }

    /// The advisory currently visible, if it has not expired.
    #[must_use]
    pub fn current(&self) -> Option<String> {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        match &*slot {
            Some(s) if s.expires_at > self.clock.now() => Some(s.text.clone()),
            Some(_) => {
                *slot = None;
                None
            }
            None => None,
        }
    }

    pub fn clear(&self) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}
