//! Tests for building maps from declarative descriptions.

use geo::{point, Geometry};
use renderer::{ConfigError, FailurePolicy, MapConfig};
use serde_json::json;
use test_utils::{assert_pixel_eq, pixels, square, temp_test_dir, write_geojson};
use tiles_common::Status;

#[test]
fn test_yaml_map_renders() {
    let dir = temp_test_dir();
    let parks: Geometry<f64> = square(20.0, 20.0, 80.0, 80.0).into();
    let sites: Geometry<f64> = point!(x: 90.0, y: 90.0).into();
    write_geojson(
        dir.path(),
        "parks",
        vec![
            (Some(parks), json!({"kind": "garden"})),
            (Some(sites), json!({"kind": "site"})),
            (None, json!({"kind": "garden"})),
        ],
    );

    let yaml = r##"
projection: "EPSG:3857"
width: 100
height: 100
bounds: [0, 0, 100, 100]
layers:
  - type: vector
    source: parks.geojson
    projection: "EPSG:3857"
    rules:
      - query: "SELECT * FROM parks WHERE kind = 'garden'"
        styles:
          - { key: fill, arg: "#ff0000ff" }
      - query: "SELECT * FROM parks WHERE kind = 'site'"
        styles:
          - { key: radius, arg: "4" }
          - { key: fill, arg: "#0000ffff" }
"##;
    let config_path = dir.path().join("map.yaml");
    std::fs::write(&config_path, yaml).unwrap();

    let config = MapConfig::from_file(&config_path).unwrap();
    let mut map = config.build(dir.path()).unwrap();
    assert!(map.is_valid());

    let surface = map.build_surface().unwrap();
    assert_eq!(map.status(), Status::Ok);
    assert_pixel_eq!(surface.pixel(50, 50).unwrap(), pixels::RED, 1);
    assert_pixel_eq!(surface.pixel(90, 10).unwrap(), pixels::BLUE, 1);
}

#[test]
fn test_tile_config() {
    let config = MapConfig::from_json(
        r#"{"tile": {"z": 3, "x": 2, "y": 5}, "failure_policy": "skip_rule",
            "layers": [{"type": "raster", "source": "shade.png"}]}"#,
    )
    .unwrap();
    let map = config.build(std::path::Path::new("/data")).unwrap();
    assert_eq!(map.width(), 256);
    assert_eq!(map.failure_policy(), FailurePolicy::SkipRule);
    assert!(map.is_valid());
}

#[test]
fn test_missing_geojson_is_data_source_error() {
    let dir = temp_test_dir();
    let config = MapConfig::from_yaml(
        r#"
tile: { z: 0, x: 0, y: 0 }
layers:
  - type: vector
    source: nowhere.geojson
"#,
    )
    .unwrap();
    match config.build(dir.path()) {
        Err(ConfigError::Map(err)) => assert_eq!(err.status(), Status::DataSourceError),
        Err(other) => panic!("unexpected error {}", other),
        Ok(_) => panic!("expected failure"),
    }
}

#[test]
fn test_bad_projection_is_map_error() {
    let config = MapConfig::from_yaml(
        r#"
projection: "EPSG:27700"
width: 10
height: 10
bounds: [0, 0, 1, 1]
layers:
  - type: raster
    source: a.png
"#,
    )
    .unwrap();
    match config.build(std::path::Path::new(".")) {
        Err(ConfigError::Map(err)) => assert_eq!(err.status(), Status::ProjectionError),
        Err(other) => panic!("unexpected error {}", other),
        Ok(_) => panic!("expected failure"),
    }
}
