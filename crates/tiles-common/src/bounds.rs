//! Map extent types and operations.

use serde::{Deserialize, Serialize};

/// A point in the map's working coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coord {
    pub x: f64,
    pub y: f64,
}

impl Coord {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned extent described by its northwest and southeast corners.
///
/// Bounds only ever grow: `extend` widens the rectangle to include a point and
/// never moves a corner inwards. Coordinates are in the units of whatever
/// projection the owner works in (degrees for EPSG:4326, meters for EPSG:3857).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub nw: Coord,
    pub se: Coord,
}

impl Bounds {
    /// Create degenerate bounds covering a single point.
    pub fn from_point(x: f64, y: f64) -> Self {
        Self {
            nw: Coord::new(x, y),
            se: Coord::new(x, y),
        }
    }

    /// Create the smallest bounds enclosing both points, in any argument order.
    pub fn from_corners(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        let mut bounds = Self::from_point(x1, y1);
        bounds.extend(x2, y2);
        bounds
    }

    /// Grow the rectangle so that it contains `(x, y)`.
    pub fn extend(&mut self, x: f64, y: f64) {
        self.nw.x = self.nw.x.min(x);
        self.nw.y = self.nw.y.max(y);
        self.se.x = self.se.x.max(x);
        self.se.y = self.se.y.min(y);
    }

    pub fn min_x(&self) -> f64 {
        self.nw.x
    }

    pub fn max_x(&self) -> f64 {
        self.se.x
    }

    pub fn min_y(&self) -> f64 {
        self.se.y
    }

    pub fn max_y(&self) -> f64 {
        self.nw.y
    }

    /// Width of the bounds in coordinate units.
    pub fn width(&self) -> f64 {
        self.se.x - self.nw.x
    }

    /// Height of the bounds in coordinate units.
    pub fn height(&self) -> f64 {
        self.nw.y - self.se.y
    }

    /// Check if a point is contained within the bounds (edges inclusive).
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.nw.x && x <= self.se.x && y >= self.se.y && y <= self.nw.y
    }

    /// Check if these bounds overlap another, touching edges included.
    pub fn intersects(&self, other: &Bounds) -> bool {
        self.nw.x <= other.se.x
            && self.se.x >= other.nw.x
            && self.se.y <= other.nw.y
            && self.nw.y >= other.se.y
    }

    /// Translate a working-space coordinate into surface-local space.
    ///
    /// X grows east from the northwest corner, y grows south from it.
    pub fn to_local(&self, x: f64, y: f64) -> (f64, f64) {
        (x - self.nw.x, self.nw.y - y)
    }
}
