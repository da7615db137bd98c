use std::path::PathBuf;

/// Runtime configuration for a planning session and its collaborator clients.
///
/// Every field has a default; the environment only needs to override what
/// differs from the public-service setup (for example pointing the optimizer
/// at a self-hosted instance).
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the place-search / reverse-geocode service.
    pub geocoder_url: String,
    /// Base URL of the nearby-POI interpreter.
    pub poi_url: String,
    /// Base URL of the optimizer backend (`/optimize-route`, `/distance-matrix`).
    pub optimizer_url: String,
    /// Base URL of the drivable-path service.
    pub router_url: String,
    pub log_level: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    /// Quiet interval for search and preview debouncing.
    pub search_debounce_ms: u64,
    /// Maximum suggestions requested per search call.
    pub search_limit: u32,
    /// How long a user-visible advisory stays up before expiring.
    pub advisory_ttl_secs: u64,
    /// Radius for the nearby-POI lookup, in meters.
    pub poi_radius_m: u32,
    /// Capacity of the recent-searches ring.
    pub recents_cap: usize,
    /// Stop count above which a soft performance advisory is raised.
    pub stop_soft_cap: usize,
    /// Directory for the JSON-file key/value store; `None` keeps persistence
    /// in memory only.
    pub storage_path: Option<PathBuf>,
}
