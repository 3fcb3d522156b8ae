//! Request and response shapes of the search pipeline.

use klanavo_core::{Listing, LocatedListing, RouteGeometry, SearchFilters};
use serde::{Deserialize, Serialize};

use crate::error::SearchError;

const DEFAULT_RADIUS_KM: u32 = 10;
const DEFAULT_STEP_KM: f64 = 10.0;

/// Route search input. Field names follow the public JSON API (`ziel` is the
/// destination).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSearchRequest {
    pub start: String,
    #[serde(rename = "ziel")]
    pub destination: String,
    /// Search radius around each postal code, in km.
    #[serde(default = "default_radius")]
    pub radius: u32,
    /// Sampling distance along the route, in km.
    #[serde(default = "default_step")]
    pub step: f64,
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub min_price: Option<u32>,
    #[serde(default)]
    pub max_price: Option<u32>,
    #[serde(default)]
    pub category: Option<u32>,
}

fn default_radius() -> u32 {
    DEFAULT_RADIUS_KM
}

fn default_step() -> f64 {
    DEFAULT_STEP_KM
}

impl RouteSearchRequest {
    #[must_use]
    pub fn new(start: &str, destination: &str) -> Self {
        Self {
            start: start.to_owned(),
            destination: destination.to_owned(),
            radius: DEFAULT_RADIUS_KM,
            step: DEFAULT_STEP_KM,
            query: None,
            min_price: None,
            max_price: None,
            category: None,
        }
    }

    /// # Errors
    ///
    /// Returns [`SearchError::InvalidRequest`] for a blank start or
    /// destination, or a step that is not a positive finite number.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.start.trim().is_empty() {
            return Err(SearchError::InvalidRequest("start must not be empty".into()));
        }
        if self.destination.trim().is_empty() {
            return Err(SearchError::InvalidRequest("ziel must not be empty".into()));
        }
        if !self.step.is_finite() || self.step <= 0.0 {
            return Err(SearchError::InvalidRequest(format!(
                "step must be a positive number of km, got {}",
                self.step
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn step_meters(&self) -> f64 {
        self.step * 1000.0
    }

    /// Filters applied to every per-postal-code fetch; the location is set
    /// per fetch.
    #[must_use]
    pub fn filters(&self) -> SearchFilters {
        SearchFilters {
            query: self.query.clone().filter(|q| !q.trim().is_empty()),
            location: None,
            radius_km: Some(self.radius),
            min_price: self.min_price,
            max_price: self.max_price,
            category_id: self.category,
            page_count: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSearchResponse {
    pub route: RouteGeometry,
    pub listings: Vec<LocatedListing>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub data: Vec<Listing>,
}
