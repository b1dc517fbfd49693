//! Vector data sources.
//!
//! A [`DataSource`] answers a query string plus a clipping polygon (in the
//! source's native projection) with a lazy stream of feature geometries.
//! Features without geometry are yielded as `None` so callers can skip them.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use geo::{BoundingRect, Geometry, Intersects, Polygon};
use geojson::GeoJson;
use projection::Projection;
use serde_json::{Map as JsonObject, Value};
use tiles_common::{TilesError, TilesResult};
use tracing::{debug, warn};

use crate::query::Query;

/// Lazily evaluated query results.
pub type FeatureIter<'a> = Box<dyn Iterator<Item = Option<Geometry<f64>>> + 'a>;

/// A vector data source that can be queried by a layer's rules.
pub trait DataSource {
    /// Native spatial reference of the stored geometries.
    fn projection(&self) -> &Projection;

    /// Run `query`, yielding only features whose extent intersects `clip`.
    fn query(&self, query: &str, clip: &Polygon<f64>) -> TilesResult<FeatureIter<'_>>;

    /// Human-readable name used in log output.
    fn name(&self) -> &str;
}

/// A feature: optional geometry plus its attribute table.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub geometry: Option<Geometry<f64>>,
    pub properties: JsonObject<String, Value>,
}

impl Feature {
    pub fn new(geometry: impl Into<Geometry<f64>>) -> Self {
        Self {
            geometry: Some(geometry.into()),
            properties: JsonObject::new(),
        }
    }

    /// A feature that carries attributes but no geometry.
    pub fn empty() -> Self {
        Self {
            geometry: None,
            properties: JsonObject::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

/// Named tables of features held in memory.
#[derive(Debug, Clone)]
pub struct MemorySource {
    name: String,
    projection: Projection,
    tables: HashMap<String, Vec<Feature>>,
}

impl MemorySource {
    pub fn new(name: impl Into<String>, projection: Projection) -> Self {
        Self {
            name: name.into(),
            projection,
            tables: HashMap::new(),
        }
    }

    /// Add or replace a table.
    pub fn add_table(&mut self, table: impl Into<String>, features: Vec<Feature>) {
        self.tables.insert(table.into(), features);
    }

    pub fn with_table(mut self, table: impl Into<String>, features: Vec<Feature>) -> Self {
        self.add_table(table, features);
        self
    }

    pub fn set_projection(&mut self, projection: Projection) {
        self.projection = projection;
    }

    pub fn table(&self, table: &str) -> Option<&[Feature]> {
        self.tables.get(table).map(Vec::as_slice)
    }
}

impl DataSource for MemorySource {
    fn projection(&self) -> &Projection {
        &self.projection
    }

    fn query(&self, query: &str, clip: &Polygon<f64>) -> TilesResult<FeatureIter<'_>> {
        let query = Query::parse(query)?;
        let features = self.tables.get(&query.table).ok_or_else(|| {
            TilesError::DataSourceError(format!(
                "{}: no such table '{}'",
                self.name, query.table
            ))
        })?;
        debug!(
            source = %self.name,
            table = %query.table,
            conditions = query.conditions.len(),
            "executing query"
        );

        let clip = clip.clone();
        let iter = features
            .iter()
            .filter(move |feature| query.matches(&feature.properties))
            .filter(move |feature| match &feature.geometry {
                None => true,
                Some(geometry) => geometry
                    .bounding_rect()
                    .map_or(false, |extent| extent.intersects(&clip)),
            })
            .map(|feature| feature.geometry.clone());
        Ok(Box::new(iter))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// A GeoJSON document exposed as a single table named after the file stem.
///
/// GeoJSON coordinates are WGS84 unless overridden with
/// [`GeoJsonSource::with_projection`].
#[derive(Debug, Clone)]
pub struct GeoJsonSource {
    path: Option<PathBuf>,
    inner: MemorySource,
}

impl GeoJsonSource {
    pub fn open(path: impl AsRef<Path>) -> TilesResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            TilesError::DataSourceError(format!("error opening data source {}: {}", path.display(), e))
        })?;
        let table = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("features");
        let mut source = Self::parse(table, &text)?;
        source.path = Some(path.to_path_buf());
        source.inner.name = path.display().to_string();
        Ok(source)
    }

    /// Parse a GeoJSON document into a source with one table.
    pub fn parse(table: &str, text: &str) -> TilesResult<Self> {
        let geojson = text.parse::<GeoJson>().map_err(|e| {
            TilesError::DataSourceError(format!("invalid GeoJSON for table '{}': {}", table, e))
        })?;

        let features = match geojson {
            GeoJson::FeatureCollection(collection) => collection
                .features
                .into_iter()
                .map(convert_feature)
                .collect::<TilesResult<Vec<_>>>()?,
            GeoJson::Feature(feature) => vec![convert_feature(feature)?],
            GeoJson::Geometry(geometry) => vec![Feature {
                geometry: Some(convert_geometry(geometry)?),
                properties: JsonObject::new(),
            }],
        };
        debug!(table, features = features.len(), "loaded GeoJSON");

        Ok(Self {
            path: None,
            inner: MemorySource::new(table, Projection::Geographic).with_table(table, features),
        })
    }

    pub fn with_projection(mut self, projection: Projection) -> Self {
        self.inner.set_projection(projection);
        self
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl DataSource for GeoJsonSource {
    fn projection(&self) -> &Projection {
        self.inner.projection()
    }

    fn query(&self, query: &str, clip: &Polygon<f64>) -> TilesResult<FeatureIter<'_>> {
        self.inner.query(query, clip)
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

fn convert_feature(feature: geojson::Feature) -> TilesResult<Feature> {
    let geometry = feature.geometry.map(convert_geometry).transpose()?;
    if geometry.is_none() {
        warn!(id = ?feature.id, "feature has no geometry");
    }
    Ok(Feature {
        geometry,
        properties: feature.properties.unwrap_or_default(),
    })
}

fn convert_geometry(geometry: geojson::Geometry) -> TilesResult<Geometry<f64>> {
    Geometry::<f64>::try_from(geometry)
        .map_err(|e| TilesError::DataSourceError(format!("unsupported geometry: {}", e)))
}

/// Open a data source from an identifier.
///
/// Files ending in `.geojson` or `.json` are read as GeoJSON.
pub fn open(identifier: &str) -> TilesResult<Box<dyn DataSource>> {
    let path = Path::new(identifier);
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("geojson") || ext.eq_ignore_ascii_case("json") => {
            Ok(Box::new(GeoJsonSource::open(path)?))
        }
        _ => Err(TilesError::DataSourceError(format!(
            "error opening data source {}: unrecognized format",
            identifier
        ))),
    }
}
