use serde::{Deserialize, Serialize};

/// Upper bound on result pages the classifieds provider serves per search.
pub const MAX_PAGE_COUNT: u32 = 20;

/// A WGS84 position, longitude first.
///
/// Serialized as a `[lon, lat]` pair so the order survives every boundary
/// (routing provider, geocoder, HTTP responses) without transposition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinate {
    pub lon: f64,
    pub lat: f64,
}

impl Coordinate {
    #[must_use]
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

impl From<[f64; 2]> for Coordinate {
    fn from([lon, lat]: [f64; 2]) -> Self {
        Self { lon, lat }
    }
}

impl From<Coordinate> for [f64; 2] {
    fn from(c: Coordinate) -> Self {
        [c.lon, c.lat]
    }
}

/// Ordered path from start to destination as returned by the router.
pub type RouteGeometry = Vec<Coordinate>;

/// Result of reverse-geocoding one coordinate.
///
/// `postal_code == None` means the lookup did not resolve; such an area is
/// never used for a listing fetch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostalArea {
    pub postal_code: Option<String>,
    pub locality: Option<String>,
    pub coordinate: Option<Coordinate>,
}

impl PostalArea {
    #[must_use]
    pub fn unresolved() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.postal_code.is_some()
    }

    /// Human-readable label: `"10115 Berlin"`, or just the postal code when
    /// no locality is known.
    #[must_use]
    pub fn label(&self) -> Option<String> {
        let plz = self.postal_code.as_deref()?;
        Some(match self.locality.as_deref() {
            Some(city) if !city.is_empty() => format!("{plz} {city}"),
            _ => plz.to_string(),
        })
    }
}

/// One classified ad as extracted from a results page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    pub adid: String,
    pub url: String,
    pub title: String,
    /// Digits only (`"1234"`); empty when the ad shows no price.
    pub price: String,
    pub description: String,
}

/// A listing stamped with the postal area it was found through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocatedListing {
    #[serde(flatten)]
    pub listing: Listing,
    #[serde(rename = "plz")]
    pub postal_code: String,
    pub label: String,
    pub lat: f64,
    pub lon: f64,
}

/// Search parameters shared by the single-location lookup and the per-postal-code
/// fetches of a route search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilters {
    pub query: Option<String>,
    pub location: Option<String>,
    pub radius_km: Option<u32>,
    pub min_price: Option<u32>,
    pub max_price: Option<u32>,
    pub category_id: Option<u32>,
    #[serde(default = "default_page_count")]
    pub page_count: u32,
}

fn default_page_count() -> u32 {
    1
}

impl SearchFilters {
    /// Returns a copy of these filters targeting a different location.
    #[must_use]
    pub fn for_location(&self, location: &str) -> Self {
        Self {
            location: Some(location.to_string()),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn has_price_filter(&self) -> bool {
        self.min_price.is_some() || self.max_price.is_some()
    }

    /// Requested page count clamped to `1..=MAX_PAGE_COUNT`.
    #[must_use]
    pub fn effective_page_count(&self) -> u32 {
        self.page_count.clamp(1, MAX_PAGE_COUNT)
    }
}
