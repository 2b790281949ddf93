//! Great-circle distance on a spherical Earth.

use crate::Coordinate;

/// Mean Earth radius in kilometres (IUGG).
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Haversine distance between two coordinates, in kilometres.
///
/// The result is symmetric, never negative and exactly zero for identical
/// points. Inputs are not validated; callers filter invalid coordinates first.
///
/// # Examples
///
/// ```rust
/// use driveshare_geo::{Coordinate, haversine_km};
///
/// let toronto = Coordinate::new(43.6532, -79.3832);
/// let montreal = Coordinate::new(45.5017, -73.5673);
/// let d = haversine_km(toronto, montreal);
/// assert!((d - 504.0).abs() < 5.0);
/// ```
#[must_use]
pub fn haversine_km(from: Coordinate, to: Coordinate) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let delta_lat = (to.latitude - from.latitude).to_radians();
    let delta_lon = (to.longitude - from.longitude).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
    // Rounding can push `a` a hair above 1 for antipodal points.
    let c = 2.0 * a.clamp(0.0, 1.0).sqrt().asin();

    EARTH_RADIUS_KM * c
}

/// Kilometres spanned by one degree of latitude.
#[must_use]
pub fn km_per_degree_lat() -> f64 {
    EARTH_RADIUS_KM * std::f64::consts::PI / 180.0
}
