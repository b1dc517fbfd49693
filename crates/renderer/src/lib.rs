//! Rule-based rendering of styled vector and raster layers into images.
//!
//! A [`Map`] holds an extent, a projection, an output size and an ordered
//! list of [`Layer`]s. Vector layers own [`Rule`]s, each pairing a query
//! against a [`DataSource`] with the [`Style`]s its features are drawn with.
//! Rendering walks layers and rules in order, dispatches every returned
//! geometry to a path or point drawing routine, and applies styles through a
//! fixed key-to-verb table.

pub mod config;
pub mod context;
pub mod dispatch;
pub mod layer;
pub mod map;
pub mod png;
pub mod query;
pub mod raster;
pub mod rule;
pub mod source;
pub mod style;
pub mod surface;
pub mod text;

pub use config::{ConfigError, LayerConfig, MapConfig};
pub use context::Context;
pub use layer::{FailurePolicy, Layer, VectorLayer};
pub use map::Map;
pub use raster::RasterLayer;
pub use rule::Rule;
pub use source::{DataSource, Feature, GeoJsonSource, MemorySource};
pub use style::{Style, StyleTarget};
pub use surface::Surface;
pub use text::TextLayout;
