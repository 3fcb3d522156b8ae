//! In-process usage counters.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use sha2::{Digest, Sha256};

/// Point-in-time copy of the counters, as served by the stats endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub searches_saved: u64,
    pub listings_found: u64,
    pub visitors: usize,
}

#[derive(Default)]
struct Counters {
    searches_saved: u64,
    listings_found: u64,
    visitors: HashSet<String>,
}

/// Route searches served, listings returned, and distinct visitors.
///
/// Visitors are stored as SHA-256 hex digests of their IP, never the raw
/// address. Nothing is persisted.
#[derive(Default)]
pub struct UsageStats {
    counters: Mutex<Counters>,
}

impl UsageStats {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_search(&self, listings: usize) {
        let mut c = self.lock();
        c.searches_saved = c.searches_saved.saturating_add(1);
        c.listings_found = c
            .listings_found
            .saturating_add(u64::try_from(listings).unwrap_or(u64::MAX));
    }

    pub fn record_visitor(&self, ip: &str) {
        let ip = ip.trim();
        if ip.is_empty() {
            return;
        }
        self.lock().visitors.insert(visitor_id(ip));
    }

    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        let c = self.lock();
        StatsSnapshot {
            searches_saved: c.searches_saved,
            listings_found: c.listings_found,
            visitors: c.visitors.len(),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Counters> {
        self.counters.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn visitor_id(ip: &str) -> String {
    format!("{:x}", Sha256::digest(ip.as_bytes()))
}
