//! Command handlers: build the production pipeline, run one search, print JSON.

use klanavo_core::{AppConfig, SearchFilters};
use klanavo_search::{build_route_search, RouteSearchRequest};

/// Runs a single-location search and prints `{ "data": [...] }` to stdout.
///
/// # Errors
///
/// Returns an error if the pipeline cannot be built or the search fails.
pub(crate) async fn run_search(config: &AppConfig, filters: &SearchFilters) -> anyhow::Result<()> {
    let search = build_route_search(config)?;
    let response = search.search(filters).await?;
    tracing::info!(listings = response.data.len(), "search complete");
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

/// Runs a route search and prints `{ "route": [...], "listings": [...] }`.
///
/// # Errors
///
/// Returns an error if the pipeline cannot be built, `ORS_API_KEY` is
/// missing, or geocoding/routing fails.
pub(crate) async fn run_route(
    config: &AppConfig,
    request: &RouteSearchRequest,
) -> anyhow::Result<()> {
    let search = build_route_search(config)?;
    let response = search.route_search(request).await?;
    tracing::info!(
        route_points = response.route.len(),
        listings = response.listings.len(),
        "route search complete"
    );
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
