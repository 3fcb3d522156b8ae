//! Process-wide memo of reverse-geocode results.
//!
//! Keys are coordinates rounded to three decimal degrees (about 110 m of
//! latitude), so neighbouring sample points share one upstream lookup.
//! Entries never expire. Unresolved lookups are stored too and count as hits.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use klanavo_core::PostalArea;
use tokio::sync::OnceCell;

/// Ground size of one cache cell along a meridian, in metres.
pub const CACHE_RESOLUTION_M: f64 = 111.32;

/// Cache key for a coordinate: `"{lat:.3}|{lon:.3}"`.
#[must_use]
pub fn cache_key(lat: f64, lon: f64) -> String {
    format!("{lat:.3}|{lon:.3}")
}

/// Thread-safe reverse-geocode cache with at most one in-flight lookup per key.
///
/// Concurrent callers for the same key wait on the first caller's lookup
/// instead of issuing their own. If that lookup is cancelled, the slot stays
/// empty and the next caller resolves it.
#[derive(Default)]
pub struct PostalCache {
    slots: Mutex<HashMap<String, Arc<OnceCell<PostalArea>>>>,
}

impl PostalCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached area for `key`, or runs `resolve` once to fill it.
    pub async fn get_or_resolve<F, Fut>(&self, key: &str, resolve: F) -> PostalArea
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = PostalArea>,
    {
        let slot = self.slot(key);
        slot.get_or_init(resolve).await.clone()
    }

    /// Cached area for `key`, if a lookup has completed.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<PostalArea> {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.get(key).and_then(|cell| cell.get().cloned())
    }

    /// Stores `area` under `key`, unless the key is already resolved.
    pub fn insert(&self, key: &str, area: PostalArea) {
        // An already-initialised cell keeps its first value.
        let _ = self.slot(key).set(area);
    }

    /// Number of completed entries.
    #[must_use]
    pub fn len(&self) -> usize {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.values().filter(|cell| cell.initialized()).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, key: &str) -> Arc<OnceCell<PostalArea>> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(
            slots
                .entry(key.to_owned())
                .or_insert_with(|| Arc::new(OnceCell::new())),
        )
    }
}
