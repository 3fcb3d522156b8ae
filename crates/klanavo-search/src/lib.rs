//! Route-based listing aggregation.
//!
//! [`RouteSearch`] composes the geocoder, router, sampler and listing source
//! into the end-to-end pipeline: resolve endpoints, route, sample postal
//! areas, fetch listings per postal code and merge them without duplicates.

pub mod error;
pub mod merge;
pub mod orchestrator;
pub mod request;
pub mod stats;
pub mod wiring;

pub use error::{ErrorClass, SearchError};
pub use merge::{merge_listings, PostalStop};
pub use orchestrator::RouteSearch;
pub use request::{RouteSearchRequest, RouteSearchResponse, SearchResponse};
pub use stats::{StatsSnapshot, UsageStats};
pub use wiring::{build_route_search, SetupError};
