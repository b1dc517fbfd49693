//! Common test fixtures for map rendering tests.
//!
//! This module provides pre-defined extents and style sets that represent
//! common rendering scenarios.

/// Common extents, as `(min_x, min_y, max_x, max_y)`.
pub mod extent {
    /// A 100x100 unit square anchored at the origin
    pub const UNIT_100: (f64, f64, f64, f64) = (0.0, 0.0, 100.0, 100.0);

    /// Global geographic extent
    pub const GLOBAL_DEGREES: (f64, f64, f64, f64) = (-180.0, -90.0, 180.0, 90.0);

    /// Full Web Mercator plane in meters
    pub const WEB_MERCATOR_WORLD: (f64, f64, f64, f64) = (
        -20037508.34,
        -20037508.34,
        20037508.34,
        20037508.34,
    );

    /// Continental United States in degrees
    pub const CONUS: (f64, f64, f64, f64) = (-130.0, 20.0, -60.0, 55.0);
}

/// Common color arguments in the `#RRGGBBAA` form styles accept.
pub mod colors {
    pub const RED: &str = "#ff0000ff";
    pub const GREEN: &str = "#00ff00ff";
    pub const BLUE: &str = "#0000ffff";
    pub const BLACK: &str = "#000000ff";
    pub const HALF_WHITE: &str = "#ffffff80";
}

/// Straight RGBA pixel values matching [`colors`].
pub mod pixels {
    pub const RED: [u8; 4] = [255, 0, 0, 255];
    pub const GREEN: [u8; 4] = [0, 255, 0, 255];
    pub const BLUE: [u8; 4] = [0, 0, 255, 255];
    pub const BLACK: [u8; 4] = [0, 0, 0, 255];
    pub const TRANSPARENT: [u8; 4] = [0, 0, 0, 0];
}

/// A filled polygon with a black outline.
pub fn polygon_styles() -> Vec<(&'static str, &'static str)> {
    vec![
        ("fill", colors::RED),
        ("stroke", colors::BLACK),
        ("weight", "2"),
    ]
}

/// A plain line style.
pub fn line_styles() -> Vec<(&'static str, &'static str)> {
    vec![
        ("fill", colors::BLUE),
        ("weight", "3"),
        ("line-cap", "round"),
        ("line-join", "round"),
    ]
}

/// Point markers with a radius.
pub fn point_styles(radius: &'static str) -> Vec<(&'static str, &'static str)> {
    vec![("radius", radius), ("fill", colors::GREEN)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extents_are_ordered() {
        for (min_x, min_y, max_x, max_y) in [
            extent::UNIT_100,
            extent::GLOBAL_DEGREES,
            extent::WEB_MERCATOR_WORLD,
            extent::CONUS,
        ] {
            assert!(min_x < max_x);
            assert!(min_y < max_y);
        }
    }

    #[test]
    fn test_style_sets() {
        assert_eq!(polygon_styles()[0], ("fill", "#ff0000ff"));
        assert!(point_styles("4").iter().any(|(key, _)| *key == "radius"));
        assert!(line_styles().iter().all(|(key, _)| *key != "stroke"));
    }
}
