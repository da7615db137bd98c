use crate::app_config::AppConfig;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if any present env var holds an invalid value.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the
/// process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for
/// testing or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if any present env var holds an invalid value.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing logic, decoupled from the actual environment so
/// it can be tested with a pure `HashMap` lookup — no `set_var`/`remove_var`
/// needed.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let geocoder_url = or_default("WAYPLAN_GEOCODER_URL", "https://nominatim.openstreetmap.org");
    let poi_url = or_default("WAYPLAN_POI_URL", "https://overpass-api.de/api/interpreter");
    let optimizer_url = or_default("WAYPLAN_OPTIMIZER_URL", "http://127.0.0.1:8000");
    let router_url = or_default("WAYPLAN_ROUTER_URL", "https://router.project-osrm.org");
    let log_level = or_default("WAYPLAN_LOG_LEVEL", "info");
    let request_timeout_secs = parse_u64("WAYPLAN_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("WAYPLAN_USER_AGENT", "wayplan/0.1 (route-planning)");
    let search_debounce_ms = parse_u64("WAYPLAN_SEARCH_DEBOUNCE_MS", "300")?;
    let search_limit = parse_u32("WAYPLAN_SEARCH_LIMIT", "8")?;
    let advisory_ttl_secs = parse_u64("WAYPLAN_ADVISORY_TTL_SECS", "3")?;
    let poi_radius_m = parse_u32("WAYPLAN_POI_RADIUS_M", "350")?;
    let recents_cap = parse_usize("WAYPLAN_RECENTS_CAP", "5")?;
    let stop_soft_cap = parse_usize("WAYPLAN_STOP_SOFT_CAP", "12")?;
    let storage_path = lookup("WAYPLAN_STORAGE_PATH").ok().map(PathBuf::from);

    Ok(AppConfig {
        geocoder_url,
        poi_url,
        optimizer_url,
        router_url,
        log_level,
        request_timeout_secs,
        user_agent,
        search_debounce_ms,
        search_limit,
        advisory_ttl_secs,
        poi_radius_m,
        recents_cap,
        stop_soft_cap,
        storage_path,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
