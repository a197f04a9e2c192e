//! Great-circle distance on a spherical Earth.
//!
//! `geo` ships its own haversine implementation, but it uses the IUGG mean
//! radius. Track distances here are pinned to a 6,371,000 m sphere so that
//! totals agree with the figures published alongside stored routes.

use geo::Coord;

/// Radius of the reference sphere in metres.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Distance in metres between two `[lon, lat]` coordinates.
///
/// # Examples
///
/// ```
/// use geo::Coord;
/// use waymark_core::haversine_distance_m;
///
/// let a = Coord { x: 0.0, y: 0.0 };
/// let b = Coord { x: 0.01, y: 0.0 };
/// let d = haversine_distance_m(a, b);
/// assert!((d - 1_111.95).abs() < 0.01);
/// ```
#[must_use]
pub fn haversine_distance_m(a: Coord<f64>, b: Coord<f64>) -> f64 {
    let lat1 = a.y.to_radians();
    let lat2 = b.y.to_radians();
    let half_dlat = ((b.y - a.y).to_radians() / 2.0).sin();
    let half_dlon = ((b.x - a.x).to_radians() / 2.0).sin();

    let h = half_dlat * half_dlat + lat1.cos() * lat2.cos() * half_dlon * half_dlon;
    // Rounding can push `h` marginally above one for antipodal points.
    2.0 * EARTH_RADIUS_M * h.sqrt().min(1.0).asin()
}
