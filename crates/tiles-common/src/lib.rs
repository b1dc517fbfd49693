//! Common types shared across the tiles workspace.

pub mod bounds;
pub mod color;
pub mod error;
pub mod tile;

pub use bounds::{Bounds, Coord};
pub use color::Color;
pub use error::{Status, TilesError, TilesResult};
pub use tile::{TileCoord, MERCATOR_LENGTH, TILE_SIZE};
