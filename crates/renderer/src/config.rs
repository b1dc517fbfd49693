//! Declarative map descriptions loaded from YAML or JSON.
//!
//! ```yaml
//! projection: "EPSG:3857"
//! width: 512
//! height: 512
//! bounds: [-20037508.34, -20037508.34, 20037508.34, 20037508.34]
//! failure_policy: skip_rule
//! layers:
//!   - type: raster
//!     source: basemap.png
//!   - type: vector
//!     source: parks.geojson
//!     rules:
//!       - query: "SELECT * FROM parks WHERE kind = 'garden'"
//!         styles:
//!           - { key: fill, arg: "#3a7d44ff" }
//!           - { key: stroke, arg: "#1b3d22ff" }
//! ```
//!
//! A `tile` entry (`{ z, x, y }`) may replace projection, size and bounds.

use std::fs;
use std::path::{Path, PathBuf};

use projection::Projection;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tiles_common::{TileCoord, TilesError};
use tracing::debug;

use crate::layer::{FailurePolicy, VectorLayer};
use crate::map::Map;
use crate::raster::RasterLayer;
use crate::rule::Rule;
use crate::source::GeoJsonSource;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Map(#[from] TilesError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    #[serde(default)]
    pub projection: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    /// Two corners, `[x1, y1, x2, y2]`, in any order.
    #[serde(default)]
    pub bounds: Option<[f64; 4]>,
    #[serde(default)]
    pub tile: Option<TileCoord>,
    #[serde(default)]
    pub failure_policy: FailurePolicy,
    pub layers: Vec<LayerConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LayerConfig {
    Vector {
        source: String,
        /// Overrides the source's native projection.
        #[serde(default)]
        projection: Option<String>,
        #[serde(default)]
        rules: Vec<Rule>,
    },
    Raster {
        source: String,
    },
}

impl MapConfig {
    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load a description, choosing the format from the file extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map_or(false, |ext| ext.eq_ignore_ascii_case("json"));
        let config = if is_json {
            Self::from_json(&text)?
        } else {
            Self::from_yaml(&text)?
        };
        debug!(path = %path.display(), layers = config.layers.len(), "loaded map config");
        Ok(config)
    }

    /// Check the description is complete enough to produce a renderable map.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tile.is_none() {
            if self.projection.is_none() {
                return Err(ConfigError::Validation(
                    "either tile or projection is required".to_string(),
                ));
            }
            if self.bounds.is_none() {
                return Err(ConfigError::Validation(
                    "either tile or bounds is required".to_string(),
                ));
            }
            if self.width.is_none() || self.height.is_none() {
                return Err(ConfigError::Validation(
                    "width and height are required without a tile".to_string(),
                ));
            }
        }
        if matches!((self.width, self.height), (Some(0), _) | (_, Some(0))) {
            return Err(ConfigError::Validation("size must be positive".to_string()));
        }
        if self.layers.is_empty() {
            return Err(ConfigError::Validation(
                "at least one layer is required".to_string(),
            ));
        }
        for (index, layer) in self.layers.iter().enumerate() {
            let source = match layer {
                LayerConfig::Vector { source, .. } | LayerConfig::Raster { source } => source,
            };
            if source.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "layer {} has an empty source",
                    index
                )));
            }
        }
        Ok(())
    }

    /// Build a map, resolving relative sources against `base_dir`.
    ///
    /// A tile is applied first, so explicit projection, size or bounds
    /// entries override what it derives.
    pub fn build(&self, base_dir: &Path) -> Result<Map, ConfigError> {
        self.validate()?;

        let mut map = Map::new();
        map.set_failure_policy(self.failure_policy);
        if let Some(tile) = self.tile {
            map.set_slippy_tile(tile.x, tile.y, tile.z)?;
        }
        if let Some(srs) = &self.projection {
            map.set_projection(srs)?;
        }
        if let (Some(width), Some(height)) = (self.width, self.height) {
            map.set_size(width, height);
        }
        if let Some([x1, y1, x2, y2]) = self.bounds {
            map.set_bounds(x1, y1, x2, y2)?;
        }

        for layer in &self.layers {
            match layer {
                LayerConfig::Vector {
                    source,
                    projection,
                    rules,
                } => {
                    let mut data = GeoJsonSource::open(resolve(base_dir, source))?;
                    if let Some(srs) = projection {
                        let native =
                            Projection::from_user_input(srs).map_err(TilesError::from)?;
                        data = data.with_projection(native);
                    }
                    let mut vector = VectorLayer::new(data);
                    for rule in rules {
                        vector.push_rule(rule.clone());
                    }
                    map.add_vector_layer(vector);
                }
                LayerConfig::Raster { source } => {
                    let path = resolve(base_dir, source);
                    map.add_raster_layer(&RasterLayer::new(path.to_string_lossy()));
                }
            }
        }

        Ok(map)
    }
}

fn resolve(base_dir: &Path, source: &str) -> PathBuf {
    let path = Path::new(source);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}
