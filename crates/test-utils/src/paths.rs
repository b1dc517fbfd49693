//! Path utilities for test data files.
//!
//! This module provides helpers to write GeoJSON and raster inputs into
//! temporary directories so tests never depend on checked-in data.

use std::fs;
use std::path::{Path, PathBuf};

use geo::Geometry;
use geojson::{Feature, FeatureCollection, JsonObject};
use image::{ImageBuffer, Rgb, Rgba};

/// Returns the workspace root directory.
///
/// This is determined by walking up from the current crate's manifest directory
/// until we find the workspace Cargo.toml.
pub fn workspace_root() -> PathBuf {
    // Start from the test-utils crate manifest dir
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    PathBuf::from(manifest_dir)
        .parent() // crates/
        .and_then(|p| p.parent()) // workspace root
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(manifest_dir))
}

/// Creates a temporary directory for test output.
///
/// The directory is automatically cleaned up when the returned `TempDir` is dropped.
pub fn temp_test_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temporary test directory")
}

/// Creates a temporary directory with a specific prefix.
pub fn temp_test_dir_with_prefix(prefix: &str) -> tempfile::TempDir {
    tempfile::Builder::new()
        .prefix(prefix)
        .tempdir()
        .expect("Failed to create temporary test directory")
}

/// Writes a GeoJSON FeatureCollection to `dir/{table}.geojson`.
///
/// Each entry is a geometry (or `None` for a feature without one) plus its
/// properties. The file stem doubles as the table name queries refer to.
pub fn write_geojson(
    dir: &Path,
    table: &str,
    features: Vec<(Option<Geometry<f64>>, serde_json::Value)>,
) -> PathBuf {
    let features = features
        .into_iter()
        .map(|(geometry, properties)| Feature {
            bbox: None,
            geometry: geometry
                .as_ref()
                .map(|g| geojson::Geometry::new(geojson::Value::from(g))),
            id: None,
            properties: match properties {
                serde_json::Value::Object(map) => Some(map),
                _ => Some(JsonObject::new()),
            },
            foreign_members: None,
        })
        .collect();
    let collection = FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    };

    let path = dir.join(format!("{}.geojson", table));
    let text = serde_json::to_string(&collection).expect("Failed to serialize GeoJSON fixture");
    fs::write(&path, text).expect("Failed to write GeoJSON fixture");
    path
}

/// Writes a straight-RGBA PNG fixture.
pub fn write_rgba_png(dir: &Path, name: &str, width: u32, height: u32, data: Vec<u8>) -> PathBuf {
    let path = dir.join(name);
    let image: ImageBuffer<Rgba<u8>, _> =
        ImageBuffer::from_raw(width, height, data).expect("RGBA buffer size mismatch");
    image.save(&path).expect("Failed to write PNG fixture");
    path
}

/// Writes a three-band RGB PNG fixture.
pub fn write_rgb_png(dir: &Path, name: &str, width: u32, height: u32, pixel: [u8; 3]) -> PathBuf {
    let path = dir.join(name);
    let image = ImageBuffer::from_pixel(width, height, Rgb(pixel));
    image.save(&path).expect("Failed to write PNG fixture");
    path
}
