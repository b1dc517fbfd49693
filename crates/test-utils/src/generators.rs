//! Geometry and image generators for rendering tests.
//!
//! These generators create predictable, verifiable shapes and pixel buffers
//! that can be used across the test suite.

use geo::{Coord, LineString, MultiPoint, Point, Polygon};

/// Creates an axis-aligned square polygon.
///
/// The exterior ring runs counter-clockwise from `(min_x, min_y)` and is
/// explicitly closed.
///
/// # Example
///
/// ```
/// use test_utils::square;
///
/// let poly = square(20.0, 20.0, 80.0, 80.0);
/// assert_eq!(poly.exterior().0.len(), 5);
/// ```
pub fn square(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Polygon<f64> {
    Polygon::new(
        LineString::from(vec![
            (min_x, min_y),
            (max_x, min_y),
            (max_x, max_y),
            (min_x, max_y),
            (min_x, min_y),
        ]),
        vec![],
    )
}

/// Creates a line of `count` evenly spaced vertices from `start` to `end`.
///
/// With a small span this produces runs of vertices that sit closer than a
/// device pixel apart, which is what simplification tests need.
pub fn dense_line(start: (f64, f64), end: (f64, f64), count: usize) -> LineString<f64> {
    let steps = count.max(2) - 1;
    let coords = (0..=steps)
        .map(|i| {
            let t = i as f64 / steps as f64;
            Coord {
                x: start.0 + (end.0 - start.0) * t,
                y: start.1 + (end.1 - start.1) * t,
            }
        })
        .collect::<Vec<_>>();
    LineString::new(coords)
}

/// Creates a closed regular polygon ring approximating a circle.
pub fn regular_ring(center: (f64, f64), radius: f64, sides: usize) -> LineString<f64> {
    let sides = sides.max(3);
    let mut coords: Vec<Coord<f64>> = (0..sides)
        .map(|i| {
            let angle = std::f64::consts::TAU * i as f64 / sides as f64;
            Coord {
                x: center.0 + radius * angle.cos(),
                y: center.1 + radius * angle.sin(),
            }
        })
        .collect();
    coords.push(coords[0]);
    LineString::new(coords)
}

/// Creates a `cols` x `rows` grid of points spaced `step` apart.
pub fn point_grid(origin: (f64, f64), step: f64, cols: usize, rows: usize) -> MultiPoint<f64> {
    let points = (0..rows)
        .flat_map(|row| {
            (0..cols).map(move |col| {
                Point::new(origin.0 + col as f64 * step, origin.1 + row as f64 * step)
            })
        })
        .collect::<Vec<_>>();
    MultiPoint::new(points)
}

/// Creates a solid straight-RGBA pixel buffer.
pub fn solid_rgba(width: u32, height: u32, pixel: [u8; 4]) -> Vec<u8> {
    pixel
        .iter()
        .copied()
        .cycle()
        .take(width as usize * height as usize * 4)
        .collect()
}

/// Creates an RGBA buffer whose left half is `left` and right half is `right`.
pub fn split_rgba(width: u32, height: u32, left: [u8; 4], right: [u8; 4]) -> Vec<u8> {
    let mut data = Vec::with_capacity(width as usize * height as usize * 4);
    for _ in 0..height {
        for x in 0..width {
            data.extend_from_slice(if x < width / 2 { &left } else { &right });
        }
    }
    data
}
