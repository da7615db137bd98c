//! Shared domain types and configuration for the wayplan workspace.
//!
//! The planning session, the geocoding clients, and the routing clients all
//! speak in terms of the types defined here: [`Stop`] and friends for route
//! state, [`ValidationError`] for input rejection, and [`AppConfig`] for
//! env-driven wiring of collaborator endpoints and tuning knobs.

pub mod app_config;
pub mod config;
pub mod stop;
pub mod validate;

use thiserror::Error;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use stop::{RecentSearch, ResolvedPlace, RouteSummary, SavedRoute, Stop, StopId, Suggestion};
pub use validate::{validate_coordinates, validate_stop_name, ValidationError};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
