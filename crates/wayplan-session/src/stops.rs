//! The authoritative ordered collection of route stops.

use tokio::sync::watch;

use wayplan_core::{validate_coordinates, validate_stop_name, Stop, StopId, ValidationError};

/// Partial fields for [`StopStore::update`]; `None` leaves a field alone.
#[derive(Debug, Default, Clone)]
pub struct UpdateStop {
    pub name: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub is_priority: Option<bool>,
}

/// Ordered stop list with unique ids and a revision channel.
///
/// Every mutation bumps the revision and notifies watchers so dependents
/// (distance preview, persistence) can react. Mutations are synchronous and
/// atomic; no partially applied state is ever observable.
pub struct StopStore {
    stops: Vec<Stop>,
    revision: u64,
    revision_tx: watch::Sender<u64>,
}

impl Default for StopStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StopStore {
    #[must_use]
    pub fn new() -> Self {
        let (revision_tx, _) = watch::channel(0);
        Self {
            stops: Vec::new(),
            revision: 0,
            revision_tx,
        }
    }

    /// Validates and appends a new stop, returning its id.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] for a non-finite/out-of-range coordinate
    /// or an empty/duplicate name; the store is unchanged on error.
    pub fn add(&mut self, name: &str, lat: f64, lng: f64) -> Result<StopId, ValidationError> {
        validate_coordinates(lat, lng)?;
        validate_stop_name(name, self.stops.iter().map(|s| s.name.as_str()))?;
        let stop = Stop::new(name.trim(), lat, lng);
        let id = stop.id;
        self.stops.push(stop);
        self.bump();
        Ok(id)
    }

    /// Re-inserts a previously removed stop at its original index (clamped
    /// to the current length). Used by undo; the snapshot keeps its id.
    pub fn insert_at(&mut self, index: usize, stop: Stop) {
        let index = index.min(self.stops.len());
        self.stops.insert(index, stop);
        self.bump();
    }

    /// Applies partial field updates to the stop with `id`.
    ///
    /// A missing id is a silent no-op — removal races are expected, not
    /// errors.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if the new coordinates or name fail
    /// validation; the stop is unchanged on error.
    pub fn update(&mut self, id: StopId, fields: UpdateStop) -> Result<(), ValidationError> {
        let Some(pos) = self.stops.iter().position(|s| s.id == id) else {
            return Ok(());
        };

        let lat = fields.lat.unwrap_or(self.stops[pos].lat);
        let lng = fields.lng.unwrap_or(self.stops[pos].lng);
        validate_coordinates(lat, lng)?;
        if let Some(name) = &fields.name {
            let others = self
                .stops
                .iter()
                .filter(|s| s.id != id)
                .map(|s| s.name.as_str());
            validate_stop_name(name, others)?;
        }

        let stop = &mut self.stops[pos];
        if let Some(name) = fields.name {
            stop.name = name.trim().to_string();
        }
        stop.lat = lat;
        stop.lng = lng;
        if let Some(p) = fields.is_priority {
            stop.is_priority = p;
        }
        self.bump();
        Ok(())
    }

    /// Flips the priority flag of the stop with `id`; missing id is a no-op.
    pub fn toggle_priority(&mut self, id: StopId) {
        if let Some(stop) = self.stops.iter_mut().find(|s| s.id == id) {
            stop.is_priority = !stop.is_priority;
            self.bump();
        }
    }

    /// Removes and returns the stop with `id`, if present.
    pub fn remove(&mut self, id: StopId) -> Option<(usize, Stop)> {
        let pos = self.stops.iter().position(|s| s.id == id)?;
        let stop = self.stops.remove(pos);
        self.bump();
        Some((pos, stop))
    }

    /// Moves the stop at `from` to position `to`; out-of-range indices are a
    /// no-op. Never changes any stop's id or priority flag.
    pub fn reorder(&mut self, from: usize, to: usize) {
        if from >= self.stops.len() || to >= self.stops.len() || from == to {
            return;
        }
        let stop = self.stops.remove(from);
        self.stops.insert(to, stop);
        self.bump();
    }

    /// Replaces the name and coordinates of the first stop, or creates it
    /// when the list is empty. Returns the affected stop's id.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] on bad coordinates or a name colliding
    /// with another stop.
    pub fn set_start(&mut self, name: &str, lat: f64, lng: f64) -> Result<StopId, ValidationError> {
        if self.stops.is_empty() {
            return self.add(name, lat, lng);
        }
        let id = self.stops[0].id;
        self.update(
            id,
            UpdateStop {
                name: Some(name.to_string()),
                lat: Some(lat),
                lng: Some(lng),
                is_priority: None,
            },
        )?;
        Ok(id)
    }

    /// Read-only snapshot of the current stop list.
    #[must_use]
    pub fn list(&self) -> Vec<Stop> {
        self.stops.clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.stops.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: StopId) -> Option<&Stop> {
        self.stops.iter().find(|s| s.id == id)
    }

    /// Replaces the whole list (loading a saved route).
    pub fn replace_all(&mut self, stops: Vec<Stop>) {
        self.stops = stops;
        self.bump();
    }

    /// Indices of stops whose priority flag is set, in current order.
    #[must_use]
    pub fn priority_indices(&self) -> Vec<usize> {
        self.stops
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.is_priority.then_some(i))
            .collect()
    }

    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// A watch channel that yields the revision after every mutation.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision_tx.subscribe()
    }

    fn bump(&mut self) {
        self.revision += 1;
        let _ = self.revision_tx.send(self.revision);
    }
}
