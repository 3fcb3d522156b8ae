//! OpenStreetMap Nominatim geocoding (`search` and `reverse`, `jsonv2` format).

use async_trait::async_trait;
use klanavo_core::{Coordinate, PostalArea};
use reqwest::{Client, Url};

use crate::error::GeoError;
use crate::geocoder::GeocodeProvider;
use crate::http::{build_client, join, parse_base_url, send_json};
use crate::types::{first_present, NominatimPlace, NominatimReverse};

pub const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org/";

const PROVIDER: &str = "nominatim";

/// Keyless fallback geocoder.
///
/// Nominatim's usage policy requires an identifying `User-Agent`; pass one
/// that names the application.
pub struct NominatimProvider {
    client: Client,
    base_url: Url,
    country_code: String,
}

impl NominatimProvider {
    /// # Errors
    ///
    /// Returns [`GeoError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(country_code: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, GeoError> {
        Self::with_base_url(country_code, timeout_secs, user_agent, DEFAULT_BASE_URL)
    }

    /// # Errors
    ///
    /// Returns [`GeoError::InvalidBaseUrl`] if `base_url` does not parse, or
    /// [`GeoError::Http`] if the client cannot be built.
    pub fn with_base_url(
        country_code: &str,
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, GeoError> {
        Ok(Self {
            client: build_client(timeout_secs, user_agent)?,
            base_url: parse_base_url(base_url)?,
            country_code: country_code.to_ascii_lowercase(),
        })
    }
}

#[async_trait]
impl GeocodeProvider for NominatimProvider {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn geocode(&self, text: &str) -> Result<Coordinate, GeoError> {
        let url = join(&self.base_url, "search")?;
        let request = self.client.get(url).query(&[
            ("q", text),
            ("format", "jsonv2"),
            ("limit", "1"),
            ("countrycodes", self.country_code.as_str()),
        ]);
        let places: Vec<NominatimPlace> = send_json(PROVIDER, request, "search").await?;

        let no_match = || GeoError::NoMatch {
            provider: PROVIDER,
            query: text.to_owned(),
        };
        let place = places.into_iter().next().ok_or_else(no_match)?;
        let lat = place.lat.trim().parse::<f64>().map_err(|_| no_match())?;
        let lon = place.lon.trim().parse::<f64>().map_err(|_| no_match())?;
        Ok(Coordinate::new(lon, lat))
    }

    async fn reverse(&self, point: Coordinate) -> Result<PostalArea, GeoError> {
        let url = join(&self.base_url, "reverse")?;
        let request = self.client.get(url).query(&[
            ("lat", point.lat.to_string()),
            ("lon", point.lon.to_string()),
            ("format", "jsonv2".to_owned()),
            ("zoom", "10".to_owned()),
            ("addressdetails", "1".to_owned()),
        ]);
        let body: NominatimReverse = send_json(PROVIDER, request, "reverse").await?;

        let address = body.address.unwrap_or_default();
        let Some(postal_code) = first_present(&[&address.postcode]) else {
            return Err(GeoError::NoMatch {
                provider: PROVIDER,
                query: format!("{},{}", point.lat, point.lon),
            });
        };

        Ok(PostalArea {
            postal_code: Some(postal_code),
            locality: first_present(&[
                &address.city,
                &address.town,
                &address.village,
                &address.state,
            ]),
            coordinate: Some(point),
        })
    }
}
