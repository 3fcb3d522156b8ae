//! Thinning a route to sample points at a fixed ground spacing.
//!
//! Distances use an equirectangular approximation: the longitude delta is
//! scaled by `111_320 * cos(mean latitude)` m/deg and the latitude delta by
//! `110_540` m/deg. Good enough at route scale and cheap per segment.

use klanavo_core::Coordinate;

const METERS_PER_LON_DEGREE_AT_EQUATOR: f64 = 111_320.0;
const METERS_PER_LAT_DEGREE: f64 = 110_540.0;

/// Approximate ground distance between two points in metres.
#[must_use]
pub fn segment_meters(a: Coordinate, b: Coordinate) -> f64 {
    let mean_lat = ((a.lat + b.lat) / 2.0).to_radians();
    let dx = (b.lon - a.lon) * METERS_PER_LON_DEGREE_AT_EQUATOR * mean_lat.cos();
    let dy = (b.lat - a.lat) * METERS_PER_LAT_DEGREE;
    dx.hypot(dy)
}

/// Picks route points spaced at least `step_m` metres apart.
///
/// Walks the route pairwise, accumulating segment lengths. When the total
/// reaches `step_m` the current point is emitted and the total resets to
/// zero. The first route point is never emitted. Fewer than two points, or a
/// non-positive step, yield no samples.
#[must_use]
pub fn sample_route(route: &[Coordinate], step_m: f64) -> Vec<Coordinate> {
    if route.len() < 2 || step_m.is_nan() || step_m <= 0.0 {
        return Vec::new();
    }

    let mut samples = Vec::new();
    let mut accumulated = 0.0;
    for pair in route.windows(2) {
        accumulated += segment_meters(pair[0], pair[1]);
        if accumulated >= step_m {
            samples.push(pair[1]);
            accumulated = 0.0;
        }
    }
    samples
}
