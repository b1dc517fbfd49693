//! Spherical (Web) Mercator projection.
//!
//! Maps lon/lat degrees on a sphere of radius 6378137 m onto a plane in
//! meters. Latitudes beyond ±85.0511° are clamped so the plane is square.

use std::f64::consts::PI;

/// Sphere radius used by Web Mercator (meters).
pub const RADIUS: f64 = 6378137.0;

/// Latitude at which the Mercator plane becomes square.
pub const MAX_LATITUDE: f64 = 85.0511287798066;

/// Project lon/lat degrees into Mercator meters.
pub fn forward(lon: f64, lat: f64) -> (f64, f64) {
    let lat = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);
    let x = RADIUS * lon.to_radians();
    let y = RADIUS * (PI / 4.0 + lat.to_radians() / 2.0).tan().ln();
    (x, y)
}

/// Unproject Mercator meters into lon/lat degrees.
pub fn inverse(x: f64, y: f64) -> (f64, f64) {
    let lon = (x / RADIUS).to_degrees();
    let lat = (2.0 * (y / RADIUS).exp().atan() - PI / 2.0).to_degrees();
    (lon, lat)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::{assert_approx_eq, assert_coords_approx_eq};

    #[test]
    fn test_origin() {
        let (x, y) = forward(0.0, 0.0);
        assert_coords_approx_eq!((x, y), (0.0, 0.0), 1e-9);
    }

    #[test]
    fn test_extent_is_square() {
        let (x, _) = forward(180.0, 0.0);
        let (_, y) = forward(0.0, MAX_LATITUDE);
        assert_approx_eq!(x, 20037508.342789244, 1e-6);
        assert_approx_eq!(y, x, 1e-3);
    }

    #[test]
    fn test_latitude_clamped() {
        let (_, y_pole) = forward(0.0, 90.0);
        let (_, y_max) = forward(0.0, MAX_LATITUDE);
        assert_eq!(y_pole, y_max);
    }

    #[test]
    fn test_roundtrip() {
        for &(lon, lat) in &[(-122.4, 37.8), (2.35, 48.85), (151.2, -33.9)] {
            let (x, y) = forward(lon, lat);
            let (inv_lon, inv_lat) = inverse(x, y);
            assert_coords_approx_eq!((inv_lon, inv_lat), (lon, lat), 1e-9);
        }
    }
}
