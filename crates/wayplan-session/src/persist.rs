//! Durable session state: saved routes and recent searches.
//!
//! Storage sits behind [`KeyValueStore`] so the session can run on an
//! in-memory map in tests and a JSON-file directory in the CLI. Persistence
//! is best-effort: a corrupt or missing value reads as empty, and a failed
//! write is logged and dropped. Losing a recent search must never take the
//! planning session down with it.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use wayplan_core::{RecentSearch, SavedRoute, Stop};

/// Storage key for the saved-route list.
pub const SAVED_ROUTES_KEY: &str = "saved_routes";
/// Storage key for the recent-search list.
pub const RECENTS_KEY: &str = "recent_searches";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage i/o for key {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: io::Error,
    },
}

/// Minimal string key-value persistence.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Volatile store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One file per key under a directory, created on first write.
#[derive(Debug)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let wrap = |source: io::Error| StorageError::Io {
            key: key.to_string(),
            source,
        };
        fs::create_dir_all(&self.dir).map_err(wrap)?;
        fs::write(self.path_for(key), value).map_err(wrap)
    }
}

/// Saved routes and capped recents on top of a [`KeyValueStore`].
pub struct SessionStorage {
    store: Arc<dyn KeyValueStore>,
    recents_cap: usize,
}

impl SessionStorage {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, recents_cap: usize) -> Self {
        Self { store, recents_cap }
    }

    /// All saved routes, newest first. Unreadable state reads as empty.
    #[must_use]
    pub fn saved_routes(&self) -> Vec<SavedRoute> {
        self.read_list(SAVED_ROUTES_KEY)
    }

    /// Saves a snapshot of `stops` under `name`. A blank name gets a
    /// timestamped default so every saved route stays identifiable.
    pub fn save_route(&self, name: &str, stops: Vec<Stop>) -> SavedRoute {
        let name = name.trim();
        let name = if name.is_empty() {
            format!("Route {}", Utc::now().format("%Y-%m-%d %H:%M"))
        } else {
            name.to_string()
        };
        let route = SavedRoute::new(name, stops);
        let mut routes = self.saved_routes();
        routes.insert(0, route.clone());
        self.write_list(SAVED_ROUTES_KEY, &routes);
        route
    }

    /// Removes one saved route by id; unknown ids are a no-op.
    pub fn delete_route(&self, id: Uuid) {
        let mut routes = self.saved_routes();
        let before = routes.len();
        routes.retain(|r| r.id != id);
        if routes.len() != before {
            self.write_list(SAVED_ROUTES_KEY, &routes);
        }
    }

    #[must_use]
    pub fn find_route(&self, id: Uuid) -> Option<SavedRoute> {
        self.saved_routes().into_iter().find(|r| r.id == id)
    }

    /// Recent searches, most recent first.
    #[must_use]
    pub fn recents(&self) -> Vec<RecentSearch> {
        self.read_list(RECENTS_KEY)
    }

    /// Records a selected search result. An entry matching on name and
    /// coordinates moves to the front instead of duplicating; the list is
    /// truncated to the cap.
    pub fn push_recent(&self, entry: RecentSearch) {
        let mut recents = self.recents();
        recents.retain(|r| {
            r.name != entry.name || r.lat.to_bits() != entry.lat.to_bits()
                || r.lng.to_bits() != entry.lng.to_bits()
        });
        recents.insert(0, entry);
        recents.truncate(self.recents_cap);
        self.write_list(RECENTS_KEY, &recents);
    }

    fn read_list<T: serde::de::DeserializeOwned>(&self, key: &str) -> Vec<T> {
        let raw = match self.store.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(err) => {
                tracing::warn!(key, %err, "failed to read stored list, treating as empty");
                return Vec::new();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(list) => list,
            Err(err) => {
                tracing::warn!(key, %err, "stored list is corrupt, treating as empty");
                Vec::new()
            }
        }
    }

    fn write_list<T: serde::Serialize>(&self, key: &str, list: &[T]) {
        let raw = match serde_json::to_string(list) {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!(key, %err, "failed to serialize stored list");
                return;
            }
        };
        if let Err(err) = self.store.set(key, &raw) {
            tracing::warn!(key, %err, "failed to persist stored list");
        }
    }
}
