//! Wire shapes of the provider responses. Only the fields we read are typed.

use serde::Deserialize;

/// GeoJSON `FeatureCollection` as returned by openrouteservice.
#[derive(Debug, Deserialize)]
pub(crate) struct FeatureCollection<G> {
    #[serde(default = "Vec::new")]
    pub features: Vec<Feature<G>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Feature<G> {
    pub geometry: Option<G>,
    #[serde(default)]
    pub properties: OrsProperties,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PointGeometry {
    pub coordinates: Vec<f64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LineGeometry {
    pub coordinates: Vec<Vec<f64>>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct OrsProperties {
    pub postalcode: Option<String>,
    pub locality: Option<String>,
    pub region: Option<String>,
    pub name: Option<String>,
}

/// One entry of a Nominatim `search` response. Coordinates arrive as strings.
#[derive(Debug, Deserialize)]
pub(crate) struct NominatimPlace {
    pub lat: String,
    pub lon: String,
}

/// Nominatim `reverse` response. A miss is `{"error": "..."}` with status 200.
#[derive(Debug, Deserialize)]
pub(crate) struct NominatimReverse {
    pub address: Option<NominatimAddress>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct NominatimAddress {
    pub postcode: Option<String>,
    pub city: Option<String>,
    pub town: Option<String>,
    pub village: Option<String>,
    pub state: Option<String>,
}

/// First non-blank value, trimmed.
pub(crate) fn first_present(candidates: &[&Option<String>]) -> Option<String> {
    candidates
        .iter()
        .filter_map(|c| c.as_deref())
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_owned)
}
