//! Shared test utilities for the tiles workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Temporary GeoJSON and raster files
//! - Geometry generators
//! - Common extents and style fixtures
//! - Approximate comparison macros
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{fixtures, square};
//! ```

pub mod fixtures;
pub mod generators;
pub mod paths;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use generators::*;
pub use paths::*;

/// Macro for approximate floating-point equality assertions.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(1.0001_f64, 1.0_f64, 0.001_f64); // passes
/// assert_approx_eq!(1.1_f32, 1.0_f32, 0.001_f32);    // fails
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if diff > epsilon {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}

/// Macro for approximate equality of coordinate pairs.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_coords_approx_eq;
///
/// assert_coords_approx_eq!((1.0001, 2.0001), (1.0, 2.0), 0.001);
/// ```
#[macro_export]
macro_rules! assert_coords_approx_eq {
    (($x1:expr, $y1:expr), ($x2:expr, $y2:expr), $epsilon:expr) => {{
        $crate::assert_approx_eq!($x1, $x2, $epsilon);
        $crate::assert_approx_eq!($y1, $y2, $epsilon);
    }};
}

/// Macro for comparing RGBA pixels channel by channel with a tolerance.
///
/// Anti-aliased edges and premultiplication round-trips shift channels by a
/// few units, so exact comparisons are rarely what a rendering test wants.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_pixel_eq;
///
/// assert_pixel_eq!(surface.pixel(50, 50).unwrap(), [255, 0, 0, 255], 2);
/// ```
#[macro_export]
macro_rules! assert_pixel_eq {
    ($actual:expr, $expected:expr, $tolerance:expr) => {{
        let actual: [u8; 4] = $actual;
        let expected: [u8; 4] = $expected;
        let tolerance: u8 = $tolerance;
        let close = actual
            .iter()
            .zip(expected.iter())
            .all(|(a, e)| a.abs_diff(*e) <= tolerance);
        if !close {
            panic!(
                "assertion failed: `(pixel ≈ expected)`\n  actual: `{:?}`,\nexpected: `{:?}`, tolerance `{}`",
                actual, expected, tolerance
            );
        }
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assert_approx_eq_passes() {
        assert_approx_eq!(1.0001, 1.0, 0.001);
        assert_approx_eq!(0.0, 0.0, 0.0001);
        assert_approx_eq!(-5.5, -5.500001, 0.0001);
    }

    #[test]
    #[should_panic(expected = "assertion failed")]
    fn test_assert_approx_eq_fails() {
        assert_approx_eq!(1.1, 1.0, 0.001);
    }

    #[test]
    fn test_assert_coords_approx_eq_passes() {
        assert_coords_approx_eq!((1.0001, 2.0001), (1.0, 2.0), 0.001);
    }

    #[test]
    fn test_assert_pixel_eq() {
        assert_pixel_eq!([254, 0, 1, 255], [255, 0, 0, 255], 1);
    }

    #[test]
    #[should_panic(expected = "pixel")]
    fn test_assert_pixel_eq_fails() {
        assert_pixel_eq!([200, 0, 0, 255], [255, 0, 0, 255], 2);
    }
}
