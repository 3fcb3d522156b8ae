//! The route search pipeline.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use klanavo_core::{Coordinate, Listing, SearchFilters};
use klanavo_geo::cache::CACHE_RESOLUTION_M;
use klanavo_geo::{sample_route, Geocoder, RouteProvider};
use klanavo_scraper::ListingSource;

use crate::error::SearchError;
use crate::merge::{merge_listings, PostalStop};
use crate::request::{RouteSearchRequest, RouteSearchResponse, SearchResponse};
use crate::stats::UsageStats;

const DEFAULT_MAX_CONCURRENCY: usize = 4;

/// Composes geocoding, routing, sampling and listing retrieval.
///
/// Shared state (reverse-geocode cache inside the geocoder, usage stats) is
/// injected, so one `RouteSearch` can serve many concurrent requests.
/// Without a router only single-location searches are possible; a route
/// search then fails with [`SearchError::ConfigurationMissing`].
pub struct RouteSearch {
    geocoder: Arc<Geocoder>,
    router: Option<Arc<dyn RouteProvider>>,
    listings: Arc<dyn ListingSource>,
    stats: Arc<UsageStats>,
    max_concurrency: usize,
}

impl RouteSearch {
    #[must_use]
    pub fn new(
        geocoder: Arc<Geocoder>,
        listings: Arc<dyn ListingSource>,
        stats: Arc<UsageStats>,
    ) -> Self {
        Self {
            geocoder,
            router: None,
            listings,
            stats,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }

    #[must_use]
    pub fn with_router(mut self, router: Arc<dyn RouteProvider>) -> Self {
        self.router = Some(router);
        self
    }

    /// Caps concurrent per-postal-code fetches (minimum 1).
    #[must_use]
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    #[must_use]
    pub fn stats(&self) -> &Arc<UsageStats> {
        &self.stats
    }

    #[must_use]
    pub fn geocoder(&self) -> &Arc<Geocoder> {
        &self.geocoder
    }

    #[must_use]
    pub fn has_router(&self) -> bool {
        self.router.is_some()
    }

    /// Runs the full pipeline for `request`.
    ///
    /// # Errors
    ///
    /// - [`SearchError::InvalidRequest`] for blank endpoints or a bad step.
    /// - [`SearchError::ConfigurationMissing`] when no router is configured.
    /// - [`SearchError::GeocodingFailed`] if either endpoint cannot be resolved.
    /// - [`SearchError::RoutingFailed`] if the router fails.
    ///
    /// Listing fetch failures for individual postal codes are logged and
    /// never fail the request.
    pub async fn route_search(
        &self,
        request: &RouteSearchRequest,
    ) -> Result<RouteSearchResponse, SearchError> {
        request.validate()?;
        let router = self
            .router
            .as_ref()
            .ok_or_else(|| SearchError::ConfigurationMissing("ORS_API_KEY".to_owned()))?;

        let start = self.resolve_endpoint(&request.start).await?;
        let destination = self.resolve_endpoint(&request.destination).await?;

        let route = router
            .route(start, destination)
            .await
            .map_err(|e| SearchError::RoutingFailed(e.to_string()))?;

        let step_m = request.step_meters();
        if step_m < 2.0 * CACHE_RESOLUTION_M {
            tracing::warn!(
                step_m,
                "sampling step is finer than the reverse-geocode cache cell; neighbouring samples share one lookup"
            );
        }
        let samples = sample_route(&route, step_m);
        let stops = self.resolve_stops(&samples).await;
        tracing::info!(
            start = %request.start,
            destination = %request.destination,
            route_points = route.len(),
            samples = samples.len(),
            postal_codes = stops.len(),
            "route sampled"
        );

        let batches = self.fetch_batches(&stops, &request.filters()).await;
        let listings = merge_listings(&stops, batches);

        self.stats.record_search(listings.len());
        Ok(RouteSearchResponse { route, listings })
    }

    /// Fetches listings for one location.
    ///
    /// # Errors
    ///
    /// - [`SearchError::InvalidRequest`] when `filters.location` is blank.
    /// - [`SearchError::FetchFailed`] when the listing source fails.
    pub async fn search(&self, filters: &SearchFilters) -> Result<SearchResponse, SearchError> {
        let has_location = filters
            .location
            .as_deref()
            .is_some_and(|l| !l.trim().is_empty());
        if !has_location {
            return Err(SearchError::InvalidRequest("location is required".to_owned()));
        }

        let data = self
            .listings
            .fetch(filters)
            .await
            .map_err(|e| SearchError::FetchFailed(e.to_string()))?;
        Ok(SearchResponse { data })
    }

    async fn resolve_endpoint(&self, text: &str) -> Result<Coordinate, SearchError> {
        self.geocoder
            .geocode_text(text)
            .await
            .map_err(|e| SearchError::GeocodingFailed(e.to_string()))
    }

    /// Reverse-geocodes samples in route order and keeps the first stop seen
    /// for each postal code. Unresolved samples are skipped.
    async fn resolve_stops(&self, samples: &[Coordinate]) -> Vec<PostalStop> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut stops = Vec::new();
        for sample in samples {
            let area = self.geocoder.reverse_geocode(sample.lat, sample.lon).await;
            let Some(stop) = PostalStop::from_area(&area, *sample) else {
                tracing::debug!(lat = sample.lat, lon = sample.lon, "sample has no postal code");
                continue;
            };
            if seen.insert(stop.postal_code.clone()) {
                stops.push(stop);
            }
        }
        stops
    }

    /// Fetches every stop with bounded concurrency. Completion order does
    /// not matter: results are keyed by postal code.
    async fn fetch_batches(
        &self,
        stops: &[PostalStop],
        filters: &SearchFilters,
    ) -> HashMap<String, Vec<Listing>> {
        let jobs: Vec<(String, SearchFilters)> = stops
            .iter()
            .map(|stop| {
                (
                    stop.postal_code.clone(),
                    filters.for_location(&stop.postal_code),
                )
            })
            .collect();

        let results: Vec<_> = stream::iter(jobs)
            .map(|(postal_code, per_stop)| {
                let listings = Arc::clone(&self.listings);
                async move {
                    let result = listings.fetch(&per_stop).await;
                    (postal_code, result)
                }
            })
            .buffer_unordered(self.max_concurrency)
            .collect()
            .await;

        let mut batches = HashMap::with_capacity(results.len());
        for (postal_code, result) in results {
            match result {
                Ok(listings) => {
                    tracing::debug!(
                        postal_code = %postal_code,
                        count = listings.len(),
                        "fetched listings"
                    );
                    batches.insert(postal_code, listings);
                }
                Err(e) => {
                    tracing::warn!(
                        postal_code = %postal_code,
                        source = self.listings.name(),
                        error = %e,
                        "listing fetch failed, skipping postal code"
                    );
                }
            }
        }
        batches
    }
}
