//! Shared domain types and configuration for Klanavo.
//!
//! Every other crate in the workspace speaks in terms of the types defined
//! here: coordinates are always longitude-first, listings carry a
//! digits-only price string, and search filters are the single input shape
//! for both single-location and route searches.

mod app_config;
mod config;
mod types;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use types::{
    Coordinate, Listing, LocatedListing, PostalArea, RouteGeometry, SearchFilters,
    MAX_PAGE_COUNT,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
