//! Coordinate reference system handling for map rendering.
//!
//! Supports the two frames a tile renderer needs: geographic lon/lat and
//! spherical Web Mercator. Projections are parsed from user input (EPSG codes
//! or proj4 strings) and can reproject points and bounds between each other.

pub mod mercator;
pub mod srs;

pub use mercator::{MAX_LATITUDE, RADIUS};
pub use srs::{Projection, ProjectionError, WEB_MERCATOR, WGS84};
