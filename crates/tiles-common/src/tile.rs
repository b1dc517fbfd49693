//! Slippy map tile addressing over spherical Web Mercator.

use crate::Bounds;
use serde::{Deserialize, Serialize};

/// Edge length of a slippy tile in pixels.
pub const TILE_SIZE: u32 = 256;

/// Full east-west extent of the Web Mercator plane in meters.
pub const MERCATOR_LENGTH: f64 = 40075016.68;

/// A tile coordinate (z/x/y) with y counted from the north edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    /// Zoom level
    pub z: u32,
    /// Column (x)
    pub x: u32,
    /// Row (y)
    pub y: u32,
}

impl TileCoord {
    pub fn new(z: u32, x: u32, y: u32) -> Self {
        Self { z, x, y }
    }

    /// Parse a `z/x/y` address.
    pub fn parse(s: &str) -> Option<Self> {
        let mut parts = s.trim().split('/').map(|p| p.parse::<u32>().ok());
        let z = parts.next()??;
        let x = parts.next()??;
        let y = parts.next()??;
        if parts.next().is_some() {
            return None;
        }
        Some(Self { z, x, y })
    }

    /// Edge length of this tile in projected meters.
    pub fn length(&self) -> f64 {
        MERCATOR_LENGTH / 2f64.powi(self.z as i32)
    }

    /// Projected extent of this tile.
    ///
    /// Corners are derived from the integer tile indices, so neighbouring
    /// tiles share exactly the same edge coordinates.
    pub fn mercator_bounds(&self) -> Bounds {
        let length = self.length();
        let origin = MERCATOR_LENGTH / 2.0;
        let (x, y) = (self.x as f64, self.y as f64);

        Bounds::from_corners(
            (x + 1.0) * length - origin,
            origin - (y + 1.0) * length,
            x * length - origin,
            origin - y * length,
        )
    }

    /// Get the four children tiles (zoom + 1).
    pub fn children(&self) -> [TileCoord; 4] {
        let x = self.x * 2;
        let y = self.y * 2;
        let z = self.z + 1;
        [
            TileCoord { z, x, y },
            TileCoord { z, x: x + 1, y },
            TileCoord { z, x, y: y + 1 },
            TileCoord {
                z,
                x: x + 1,
                y: y + 1,
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tile_address() {
        assert_eq!(TileCoord::parse("3/4/5"), Some(TileCoord::new(3, 4, 5)));
        assert_eq!(TileCoord::parse("3/4"), None);
        assert_eq!(TileCoord::parse("3/4/5/6"), None);
        assert_eq!(TileCoord::parse("a/4/5"), None);
    }

    #[test]
    fn test_world_tile() {
        let bounds = TileCoord::new(0, 0, 0).mercator_bounds();
        let half = MERCATOR_LENGTH / 2.0;
        assert_eq!(bounds.min_x(), -half);
        assert_eq!(bounds.max_x(), half);
        assert_eq!(bounds.min_y(), -half);
        assert_eq!(bounds.max_y(), half);
    }

    #[test]
    fn test_children_cover_parent() {
        let parent = TileCoord::new(0, 0, 0);
        let parent_bounds = parent.mercator_bounds();
        let children = parent.children();

        for child in &children {
            let b = child.mercator_bounds();
            assert_eq!(b.width(), parent_bounds.width() / 2.0);
            assert_eq!(b.height(), parent_bounds.height() / 2.0);
        }

        // north-west child sits at the top left
        let nw = children[0].mercator_bounds();
        assert_eq!(nw.nw, parent_bounds.nw);
        assert_eq!(nw.se.x, 0.0);
        assert_eq!(nw.se.y, 0.0);
    }
}
