//! Listing-source contract and the HTTP-first fallback strategy.

use std::sync::Arc;

use async_trait::async_trait;
use klanavo_core::{Listing, SearchFilters};

use crate::error::ScraperError;

/// Anything that can turn a filter set into listings for one location.
///
/// Implementations must fail with a typed [`ScraperError`] so callers can tell
/// a failed location apart from an empty one.
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Fetches every requested page for `filters`, concatenated in page order.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError`] when any page cannot be retrieved.
    async fn fetch(&self, filters: &SearchFilters) -> Result<Vec<Listing>, ScraperError>;
}

/// Tries `primary` first and falls back to an automation source on failure.
///
/// `automation` is `Some` only when a browser-automation backend is both
/// enabled and initialised. Without it, the primary error is returned as is.
pub struct FallbackListingSource {
    primary: Arc<dyn ListingSource>,
    automation: Option<Arc<dyn ListingSource>>,
}

impl FallbackListingSource {
    #[must_use]
    pub fn new(primary: Arc<dyn ListingSource>) -> Self {
        Self {
            primary,
            automation: None,
        }
    }

    #[must_use]
    pub fn with_automation(mut self, automation: Arc<dyn ListingSource>) -> Self {
        self.automation = Some(automation);
        self
    }

    #[must_use]
    pub fn has_automation(&self) -> bool {
        self.automation.is_some()
    }
}

#[async_trait]
impl ListingSource for FallbackListingSource {
    fn name(&self) -> &'static str {
        "fallback"
    }

    async fn fetch(&self, filters: &SearchFilters) -> Result<Vec<Listing>, ScraperError> {
        let primary_err = match self.primary.fetch(filters).await {
            Ok(listings) => return Ok(listings),
            Err(e) => e,
        };

        let Some(automation) = &self.automation else {
            return Err(primary_err);
        };

        tracing::warn!(
            primary = self.primary.name(),
            fallback = automation.name(),
            location = filters.location.as_deref().unwrap_or(""),
            error = %primary_err,
            "primary listing source failed, trying automation"
        );
        automation.fetch(filters).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct Fixed {
        name: &'static str,
        result: Result<Vec<Listing>, u16>,
        calls: AtomicU32,
    }

    impl Fixed {
        fn ok(name: &'static str, adids: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                name,
                result: Ok(adids.iter().map(|id| listing(id)).collect()),
                calls: AtomicU32::new(0),
            })
        }

        fn failing(name: &'static str, status: u16) -> Arc<Self> {
            Arc::new(Self {
                name,
                result: Err(status),
                calls: AtomicU32::new(0),
            })
        }
    }

    #[async_trait]
    impl ListingSource for Fixed {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn fetch(&self, _filters: &SearchFilters) -> Result<Vec<Listing>, ScraperError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.result {
                Ok(listings) => Ok(listings.clone()),
                Err(status) => Err(ScraperError::UnexpectedStatus {
                    status: *status,
                    url: format!("https://{}.test/s-seite:1", self.name),
                }),
            }
        }
    }

    fn listing(adid: &str) -> Listing {
        Listing {
            adid: adid.to_string(),
            url: format!("https://listings.test/s-anzeige/{adid}"),
            title: String::new(),
            price: String::new(),
            description: String::new(),
        }
    }

    fn filters() -> SearchFilters {
        SearchFilters::for_location(&SearchFilters::default(), "10115")
    }

    #[tokio::test]
    async fn primary_success_skips_automation() {
        let http = Fixed::ok("http", &["1"]);
        let browser = Fixed::ok("browser", &["2"]);
        let source = FallbackListingSource::new(http.clone()).with_automation(browser.clone());

        let listings = source.fetch(&filters()).await.unwrap();
        assert_eq!(listings[0].adid, "1");
        assert_eq!(browser.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn primary_failure_uses_automation_when_available() {
        let http = Fixed::failing("http", 503);
        let browser = Fixed::ok("browser", &["2"]);
        let source = FallbackListingSource::new(http.clone()).with_automation(browser.clone());

        let listings = source.fetch(&filters()).await.unwrap();
        assert_eq!(listings[0].adid, "2");
        assert_eq!(http.calls.load(Ordering::SeqCst), 1);
        assert_eq!(browser.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn without_automation_the_primary_error_surfaces() {
        let http = Fixed::failing("http", 403);
        let source = FallbackListingSource::new(http);
        assert!(!source.has_automation());

        let err = source.fetch(&filters()).await.unwrap_err();
        assert!(
            matches!(err, ScraperError::UnexpectedStatus { status: 403, ref url } if url.contains("http.test")),
            "expected the primary error, got {err:?}"
        );
    }

    #[tokio::test]
    async fn both_failing_returns_automation_error() {
        let http = Fixed::failing("http", 500);
        let browser = Fixed::failing("browser", 502);
        let source = FallbackListingSource::new(http).with_automation(browser);

        let err = source.fetch(&filters()).await.unwrap_err();
        assert!(matches!(
            err,
            ScraperError::UnexpectedStatus { status: 502, .. }
        ));
    }
}
