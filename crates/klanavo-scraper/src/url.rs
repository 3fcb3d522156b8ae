//! Search URL construction.
//!
//! The provider encodes most filters in the path, in a fixed order:
//!
//! ```text
//! /s-{location}/preis:{min}:{max}/c{category}/seite:{page}?keywords=..&locationStr=..&radius=..
//! ```
//!
//! Every segment except the page is optional. The builder is a pure function
//! of its inputs so the exact shape can be pinned down in unit tests.

use klanavo_core::SearchFilters;
use reqwest::Url;

/// Builds the results-page URL for `filters` at 1-based `page`.
///
/// Only the path and query of `base_url` are replaced; scheme, host and port
/// are kept, so the same builder targets the live site or a mock server.
#[must_use]
pub fn build_search_url(base_url: &Url, filters: &SearchFilters, page: u32) -> Url {
    let location = filters
        .location
        .as_deref()
        .map(str::trim)
        .filter(|l| !l.is_empty());
    let has_price = filters.has_price_filter();

    let mut segments: Vec<String> = Vec::with_capacity(4);
    if let Some(location) = location {
        segments.push(location.replace(' ', "-"));
    }
    if has_price {
        segments.push(format!(
            "preis:{}:{}",
            price_bound(filters.min_price),
            price_bound(filters.max_price)
        ));
    }
    if let Some(category) = filters.category_id {
        // With neither location nor price the category still needs its own
        // segment: `/s-/c{id}`.
        if segments.is_empty() {
            segments.push(String::new());
        }
        segments.push(format!("c{category}"));
    }
    segments.push(format!("seite:{page}"));

    let mut url = base_url.clone();
    url.set_path(&format!("/s-{}", segments.join("/")));
    url.set_query(None);
    url.set_fragment(None);

    let mut params: Vec<(&str, String)> = Vec::new();
    if let Some(query) = filters
        .query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
    {
        params.push(("keywords", query.to_string()));
    }
    // A zero bound still yields a price segment but does not suppress
    // `locationStr`; only a non-zero bound does.
    let narrows_price = filters
        .min_price
        .into_iter()
        .chain(filters.max_price)
        .any(|b| b > 0);
    if let Some(location) = location {
        if !narrows_price {
            params.push(("locationStr", location.to_string()));
        }
    }
    if let Some(radius) = filters.radius_km.filter(|r| *r > 0) {
        params.push(("radius", radius.to_string()));
    }
    if !params.is_empty() {
        url.query_pairs_mut().extend_pairs(params);
    }

    url
}

fn price_bound(bound: Option<u32>) -> String {
    bound.map(|b| b.to_string()).unwrap_or_default()
}
