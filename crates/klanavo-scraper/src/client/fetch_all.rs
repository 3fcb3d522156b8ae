//! Multi-page fetch for `ListingsClient` and its `ListingSource` impl.

use async_trait::async_trait;
use klanavo_core::{Listing, SearchFilters};

use crate::error::ScraperError;
use crate::source::ListingSource;

use super::ListingsClient;

impl ListingsClient {
    /// Fetches pages `1..=filters.effective_page_count()` in order and
    /// concatenates their listings.
    ///
    /// All-or-nothing: if any page fails, listings from earlier pages are
    /// discarded and the error is returned, so the caller can skip the
    /// location or hand it to a fallback source.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`Self::fetch_page`].
    pub async fn fetch_listings(
        &self,
        filters: &SearchFilters,
    ) -> Result<Vec<Listing>, ScraperError> {
        let page_count = filters.effective_page_count();
        let mut all = Vec::new();

        for page in 1..=page_count {
            let listings = self.fetch_page(filters, page).await?;
            tracing::debug!(
                location = filters.location.as_deref().unwrap_or(""),
                page,
                count = listings.len(),
                "fetched listings page"
            );
            all.extend(listings);
        }

        Ok(all)
    }
}

#[async_trait]
impl ListingSource for ListingsClient {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn fetch(&self, filters: &SearchFilters) -> Result<Vec<Listing>, ScraperError> {
        self.fetch_listings(filters).await
    }
}
