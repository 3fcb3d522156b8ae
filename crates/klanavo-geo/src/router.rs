//! Driving routes from openrouteservice directions.

use async_trait::async_trait;
use klanavo_core::{Coordinate, RouteGeometry};
use reqwest::{Client, Url};
use serde_json::json;

use crate::error::GeoError;
use crate::http::{build_client, join, parse_base_url, send_json};
use crate::ors::DEFAULT_BASE_URL;
use crate::types::{FeatureCollection, LineGeometry};

/// Computes a route between two coordinates.
#[async_trait]
pub trait RouteProvider: Send + Sync {
    /// # Errors
    ///
    /// Returns [`GeoError::RoutingFailed`] on any provider failure or
    /// malformed geometry.
    async fn route(&self, start: Coordinate, destination: Coordinate)
        -> Result<RouteGeometry, GeoError>;
}

/// `POST v2/directions/driving-car/geojson`. One attempt, no retry.
pub struct OrsRouter {
    client: Client,
    api_key: String,
    base_url: Url,
}

impl OrsRouter {
    /// # Errors
    ///
    /// Returns [`GeoError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(api_key: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, GeoError> {
        Self::with_base_url(api_key, timeout_secs, user_agent, DEFAULT_BASE_URL)
    }

    /// # Errors
    ///
    /// Returns [`GeoError::InvalidBaseUrl`] if `base_url` does not parse, or
    /// [`GeoError::Http`] if the client cannot be built.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, GeoError> {
        Ok(Self {
            client: build_client(timeout_secs, user_agent)?,
            api_key: api_key.to_owned(),
            base_url: parse_base_url(base_url)?,
        })
    }

    async fn request_route(
        &self,
        start: Coordinate,
        destination: Coordinate,
    ) -> Result<RouteGeometry, GeoError> {
        let url = join(&self.base_url, "v2/directions/driving-car/geojson")?;
        let request = self
            .client
            .post(url)
            .header(reqwest::header::AUTHORIZATION, &self.api_key)
            .json(&json!({ "coordinates": [start, destination] }));
        let collection: FeatureCollection<LineGeometry> =
            send_json("openrouteservice", request, "directions").await?;

        let coordinates = collection
            .features
            .into_iter()
            .next()
            .and_then(|f| f.geometry)
            .map(|g| g.coordinates)
            .unwrap_or_default();
        to_geometry(&coordinates)
    }
}

#[async_trait]
impl RouteProvider for OrsRouter {
    async fn route(
        &self,
        start: Coordinate,
        destination: Coordinate,
    ) -> Result<RouteGeometry, GeoError> {
        self.request_route(start, destination)
            .await
            .map_err(|e| match e {
                GeoError::RoutingFailed(_) => e,
                other => GeoError::RoutingFailed(other.to_string()),
            })
    }
}

/// Converts raw `[lon, lat(, elevation)]` positions into a geometry.
fn to_geometry(positions: &[Vec<f64>]) -> Result<RouteGeometry, GeoError> {
    if positions.is_empty() {
        return Err(GeoError::RoutingFailed("response has no geometry".to_owned()));
    }
    positions
        .iter()
        .map(|p| match p.as_slice() {
            [lon, lat, ..] if lon.is_finite() && lat.is_finite() => Ok(Coordinate::new(*lon, *lat)),
            _ => Err(GeoError::RoutingFailed(format!("malformed position {p:?}"))),
        })
        .collect()
}
