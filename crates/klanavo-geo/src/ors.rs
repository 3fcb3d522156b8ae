//! openrouteservice geocoding (Pelias-based `geocode/search` and `geocode/reverse`).

use async_trait::async_trait;
use klanavo_core::{Coordinate, PostalArea};
use reqwest::{Client, Url};

use crate::error::GeoError;
use crate::geocoder::GeocodeProvider;
use crate::http::{build_client, join, parse_base_url, send_json};
use crate::types::{first_present, FeatureCollection, PointGeometry};

pub const DEFAULT_BASE_URL: &str = "https://api.openrouteservice.org/";

const PROVIDER: &str = "openrouteservice";

/// Forward and reverse geocoding against openrouteservice, restricted to one
/// country.
pub struct OrsProvider {
    client: Client,
    api_key: String,
    base_url: Url,
    country_code: String,
}

impl OrsProvider {
    /// # Errors
    ///
    /// Returns [`GeoError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(
        api_key: &str,
        country_code: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, GeoError> {
        Self::with_base_url(api_key, country_code, timeout_secs, user_agent, DEFAULT_BASE_URL)
    }

    /// Creates a provider with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::InvalidBaseUrl`] if `base_url` does not parse, or
    /// [`GeoError::Http`] if the client cannot be built.
    pub fn with_base_url(
        api_key: &str,
        country_code: &str,
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, GeoError> {
        Ok(Self {
            client: build_client(timeout_secs, user_agent)?,
            api_key: api_key.to_owned(),
            base_url: parse_base_url(base_url)?,
            country_code: country_code.to_ascii_uppercase(),
        })
    }

    fn first_feature(
        collection: FeatureCollection<PointGeometry>,
        query: String,
    ) -> Result<crate::types::Feature<PointGeometry>, GeoError> {
        collection
            .features
            .into_iter()
            .next()
            .ok_or(GeoError::NoMatch {
                provider: PROVIDER,
                query,
            })
    }
}

#[async_trait]
impl GeocodeProvider for OrsProvider {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn geocode(&self, text: &str) -> Result<Coordinate, GeoError> {
        let url = join(&self.base_url, "geocode/search")?;
        let request = self
            .client
            .get(url)
            .header(reqwest::header::AUTHORIZATION, &self.api_key)
            .query(&[
                ("text", text),
                ("boundary.country", self.country_code.as_str()),
                ("size", "1"),
            ]);
        let collection: FeatureCollection<PointGeometry> =
            send_json(PROVIDER, request, "geocode/search").await?;

        let feature = Self::first_feature(collection, text.to_owned())?;
        match feature.geometry.as_ref().map(|g| g.coordinates.as_slice()) {
            Some([lon, lat, ..]) => Ok(Coordinate::new(*lon, *lat)),
            _ => Err(GeoError::NoMatch {
                provider: PROVIDER,
                query: text.to_owned(),
            }),
        }
    }

    async fn reverse(&self, point: Coordinate) -> Result<PostalArea, GeoError> {
        let url = join(&self.base_url, "geocode/reverse")?;
        let request = self
            .client
            .get(url)
            .header(reqwest::header::AUTHORIZATION, &self.api_key)
            .query(&[
                ("point.lat", point.lat.to_string()),
                ("point.lon", point.lon.to_string()),
                ("size", "1".to_owned()),
            ]);
        let collection: FeatureCollection<PointGeometry> =
            send_json(PROVIDER, request, "geocode/reverse").await?;

        let query = format!("{},{}", point.lat, point.lon);
        let props = Self::first_feature(collection, query.clone())?.properties;
        let Some(postal_code) = first_present(&[&props.postalcode]) else {
            return Err(GeoError::NoMatch {
                provider: PROVIDER,
                query,
            });
        };

        Ok(PostalArea {
            postal_code: Some(postal_code),
            locality: first_present(&[&props.locality, &props.region, &props.name]),
            coordinate: Some(point),
        })
    }
}
