//! Builds a [`RouteSearch`] from application configuration.

use std::sync::Arc;

use klanavo_core::AppConfig;
use klanavo_geo::{
    GeoError, GeocodeProvider, Geocoder, NominatimProvider, OrsProvider, OrsRouter, PostalCache,
};
use klanavo_scraper::{FallbackListingSource, ListingsClient, ScraperError};
use thiserror::Error;

use crate::orchestrator::RouteSearch;
use crate::stats::UsageStats;

/// Failure constructing one of the upstream clients.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("listing client: {0}")]
    Scraper(#[from] ScraperError),

    #[error("geo client: {0}")]
    Geo(#[from] GeoError),
}

/// Wires the production pipeline: HTTP listing source (no automation
/// backend), ORS then Nominatim geocoding, ORS routing.
///
/// Without an ORS key the geocoder runs on Nominatim alone and no router is
/// attached, so route searches fail with `ConfigurationMissing`.
///
/// # Errors
///
/// Returns [`SetupError`] if a base URL is invalid or an HTTP client cannot
/// be built.
pub fn build_route_search(config: &AppConfig) -> Result<RouteSearch, SetupError> {
    let timeout = config.request_timeout_secs;

    let listings = ListingsClient::with_base_url(
        &config.listings_base_url,
        timeout,
        &config.user_agent,
        config.max_retries,
        config.retry_backoff_base_ms,
    )?;
    let source = FallbackListingSource::new(Arc::new(listings));

    let mut providers: Vec<Arc<dyn GeocodeProvider>> = Vec::with_capacity(2);
    if let Some(key) = &config.ors_api_key {
        providers.push(Arc::new(OrsProvider::with_base_url(
            key,
            &config.country_code,
            timeout,
            &config.geocoder_user_agent,
            &config.ors_base_url,
        )?));
    }
    providers.push(Arc::new(NominatimProvider::with_base_url(
        &config.country_code,
        timeout,
        &config.geocoder_user_agent,
        &config.nominatim_base_url,
    )?));
    let geocoder = Geocoder::new(providers, Arc::new(PostalCache::new()));

    let search = RouteSearch::new(
        Arc::new(geocoder),
        Arc::new(source),
        Arc::new(UsageStats::new()),
    )
    .with_max_concurrency(config.max_concurrent_fetches);

    match &config.ors_api_key {
        Some(key) => {
            let router = OrsRouter::with_base_url(
                key,
                timeout,
                &config.geocoder_user_agent,
                &config.ors_base_url,
            )?;
            Ok(search.with_router(Arc::new(router)))
        }
        None => {
            tracing::warn!("ORS_API_KEY not set; route search disabled, geocoding via Nominatim only");
            Ok(search)
        }
    }
}
