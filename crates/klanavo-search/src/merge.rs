//! Deterministic merge of per-postal-code listing batches.

use std::collections::{HashMap, HashSet};

use klanavo_core::{Coordinate, Listing, LocatedListing, PostalArea};

/// A distinct postal code found along the route, with the coordinate and
/// label of the first sample that resolved to it.
#[derive(Debug, Clone, PartialEq)]
pub struct PostalStop {
    pub postal_code: String,
    pub label: String,
    pub coordinate: Coordinate,
}

impl PostalStop {
    /// Builds a stop from a resolved area. `None` for unresolved areas.
    #[must_use]
    pub fn from_area(area: &PostalArea, fallback: Coordinate) -> Option<Self> {
        let postal_code = area.postal_code.clone()?;
        let label = area.label().unwrap_or_else(|| postal_code.clone());
        Some(Self {
            postal_code,
            label,
            coordinate: area.coordinate.unwrap_or(fallback),
        })
    }
}

/// Concatenates `batches` in `stops` order, dropping listings whose URL has
/// already been emitted, and stamps each survivor with its stop.
///
/// Stops without a batch (failed or skipped fetches) contribute nothing.
#[must_use]
pub fn merge_listings(
    stops: &[PostalStop],
    mut batches: HashMap<String, Vec<Listing>>,
) -> Vec<LocatedListing> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut merged = Vec::new();

    for stop in stops {
        let Some(listings) = batches.remove(&stop.postal_code) else {
            continue;
        };
        for listing in listings {
            if !seen.insert(listing.url.clone()) {
                continue;
            }
            merged.push(LocatedListing {
                listing,
                postal_code: stop.postal_code.clone(),
                label: stop.label.clone(),
                lat: stop.coordinate.lat,
                lon: stop.coordinate.lon,
            });
        }
    }

    merged
}
