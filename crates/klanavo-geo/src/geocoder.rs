//! Provider chain for forward and reverse geocoding.

use std::sync::Arc;

use async_trait::async_trait;
use klanavo_core::{Coordinate, PostalArea};

use crate::cache::{cache_key, PostalCache};
use crate::error::GeoError;

/// One external geocoding service.
///
/// A 2xx response without a usable result is reported as
/// [`GeoError::NoMatch`] so the chain moves on to the next provider.
#[async_trait]
pub trait GeocodeProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Resolves free text to a coordinate.
    ///
    /// # Errors
    ///
    /// Any [`GeoError`]; the chain treats all of them as "try the next one".
    async fn geocode(&self, text: &str) -> Result<Coordinate, GeoError>;

    /// Resolves a coordinate to a postal code and locality. A result without
    /// a postal code must be returned as [`GeoError::NoMatch`].
    ///
    /// # Errors
    ///
    /// Any [`GeoError`]; the chain treats all of them as "try the next one".
    async fn reverse(&self, point: Coordinate) -> Result<PostalArea, GeoError>;
}

/// Ordered list of providers tried in sequence, plus the reverse cache.
pub struct Geocoder {
    providers: Vec<Arc<dyn GeocodeProvider>>,
    cache: Arc<PostalCache>,
}

impl Geocoder {
    #[must_use]
    pub fn new(providers: Vec<Arc<dyn GeocodeProvider>>, cache: Arc<PostalCache>) -> Self {
        Self { providers, cache }
    }

    #[must_use]
    pub fn cache(&self) -> &Arc<PostalCache> {
        &self.cache
    }

    #[must_use]
    pub fn provider_names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Resolves `text` with the first provider that finds it.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::GeocodingFailed`] when every provider fails.
    pub async fn geocode_text(&self, text: &str) -> Result<Coordinate, GeoError> {
        for provider in &self.providers {
            match provider.geocode(text).await {
                Ok(coordinate) => {
                    tracing::debug!(provider = provider.name(), text, "geocoded");
                    return Ok(coordinate);
                }
                Err(e) => {
                    tracing::warn!(
                        provider = provider.name(),
                        text,
                        error = %e,
                        "geocoding provider failed"
                    );
                }
            }
        }
        Err(GeoError::GeocodingFailed(text.to_owned()))
    }

    /// Resolves `(lat, lon)` to a postal area, consulting the cache first.
    ///
    /// Never fails: when no provider yields a postal code the result is an
    /// unresolved area, and that result is cached like any other.
    pub async fn reverse_geocode(&self, lat: f64, lon: f64) -> PostalArea {
        let key = cache_key(lat, lon);
        self.cache
            .get_or_resolve(&key, || self.reverse_uncached(Coordinate::new(lon, lat)))
            .await
    }

    async fn reverse_uncached(&self, point: Coordinate) -> PostalArea {
        for provider in &self.providers {
            match provider.reverse(point).await {
                Ok(mut area) if area.is_resolved() => {
                    area.coordinate = Some(point);
                    return area;
                }
                Ok(_) => {
                    tracing::debug!(
                        provider = provider.name(),
                        lat = point.lat,
                        lon = point.lon,
                        "reverse geocode returned no postal code"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        provider = provider.name(),
                        lat = point.lat,
                        lon = point.lon,
                        error = %e,
                        "reverse geocoding provider failed"
                    );
                }
            }
        }
        PostalArea {
            coordinate: Some(point),
            ..PostalArea::unresolved()
        }
    }
}

#[cfg(test)]
#[path = "geocoder_test.rs"]
mod tests;
