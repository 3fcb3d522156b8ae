//! Classified-ad listing retrieval for Klanavo.
//!
//! Builds provider search URLs, fetches result pages over HTTP, and extracts
//! listing records from the returned HTML. Sources implement
//! [`ListingSource`] so an alternate strategy (browser automation) can stand
//! in behind the same contract.

pub mod client;
pub mod error;
pub mod extract;
pub mod source;
pub mod url;

mod rate_limit;

pub use client::ListingsClient;
pub use error::ScraperError;
pub use extract::{extract_listings, normalize_price};
pub use source::{FallbackListingSource, ListingSource};
pub use url::build_search_url;
