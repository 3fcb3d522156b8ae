//! Geocoding, routing and route sampling for Klanavo.
//!
//! Forward and reverse geocoding go through an ordered chain of
//! [`GeocodeProvider`]s (openrouteservice first, Nominatim second). Reverse
//! lookups are memoised in a process-wide [`PostalCache`]. Routes come from
//! a [`RouteProvider`] and are thinned to sample points by [`sample_route`].

pub mod cache;
pub mod error;
pub mod geocoder;
pub mod nominatim;
pub mod ors;
pub mod router;
pub mod sampler;

mod http;
mod types;

pub use cache::{cache_key, PostalCache};
pub use error::GeoError;
pub use geocoder::{GeocodeProvider, Geocoder};
pub use nominatim::NominatimProvider;
pub use ors::OrsProvider;
pub use router::{OrsRouter, RouteProvider};
pub use sampler::sample_route;
