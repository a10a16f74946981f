//! Vector layer loading.
//!
//! Every loader returns a [`Layer`] instead of an error: a missing file is
//! `Absent`, a readable file without usable features is `Empty`, anything
//! that cannot be parsed is `Malformed`.

use std::fs;
use std::path::Path;

use geo::{Centroid, Geometry, Intersects, LineString, Point, Polygon, Rect};
use geojson::{Feature, FeatureCollection, GeoJson};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::config::{AmenityLayer, CoolRideConfig};
use crate::overlay::{Layer, RawLayers};
use crate::shadow::Building;

/// Loads all four overlay source layers named in the configuration.
pub fn load_layers(config: &CoolRideConfig) -> RawLayers {
    let files = &config.layers;
    RawLayers {
        park_connectors: load_park_connectors(&config.data_file(&files.park_connectors)),
        trees: load_trees(&config.data_file(&files.trees)),
        buildings: load_buildings(&config.data_file(&files.buildings)),
        water: load_water(&config.data_file(&files.water)),
    }
}

/// Park connector lines; multi-lines are split into their members.
pub fn load_park_connectors(path: &Path) -> Layer<LineString<f64>> {
    features_layer(path, |geometry, _| match geometry {
        Geometry::LineString(line) => vec![line],
        Geometry::MultiLineString(lines) => lines.0,
        _ => vec![],
    })
}

/// Tree inventory, either as CSV with `lat`/`lng` columns or as GeoJSON points.
pub fn load_trees(path: &Path) -> Layer<Point<f64>> {
    let is_csv = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if is_csv {
        load_tree_csv(path)
    } else {
        features_layer(path, |geometry, _| match geometry {
            Geometry::Point(point) => vec![point],
            Geometry::MultiPoint(points) => points.0,
            _ => vec![],
        })
    }
}

/// Building footprints. Only simple polygons are kept; a numeric `height`
/// property is used when present.
pub fn load_buildings(path: &Path) -> Layer<Building> {
    features_layer(path, |geometry, feature| match geometry {
        Geometry::Polygon(footprint) => vec![Building::new(footprint, feature_height(feature))],
        _ => vec![],
    })
}

/// Water bodies; multi-polygons are split into their members.
pub fn load_water(path: &Path) -> Layer<Polygon<f64>> {
    features_layer(path, |geometry, _| match geometry {
        Geometry::Polygon(polygon) => vec![polygon],
        Geometry::MultiPolygon(polygons) => polygons.0,
        _ => vec![],
    })
}

#[derive(Debug, Deserialize)]
struct TreeRecord {
    lat: f64,
    lng: f64,
}

fn load_tree_csv(path: &Path) -> Layer<Point<f64>> {
    if !path.exists() {
        return Layer::Absent;
    }
    let mut reader = match csv::Reader::from_path(path) {
        Ok(reader) => reader,
        Err(e) => return Layer::Malformed(format!("{}: {e}", path.display())),
    };
    let headers = match reader.headers() {
        Ok(headers) => headers.clone(),
        Err(e) => return Layer::Malformed(format!("{}: {e}", path.display())),
    };
    if !headers.iter().any(|h| h == "lat") || !headers.iter().any(|h| h == "lng") {
        let found: Vec<&str> = headers.iter().collect();
        return Layer::Malformed(format!(
            "tree CSV lacks lat/lng columns, found {found:?} (Git LFS pointer file?)"
        ));
    }

    let trees: Vec<Point<f64>> = reader
        .deserialize::<TreeRecord>()
        .filter_map(Result::ok)
        .filter(|tree| tree.lat.is_finite() && tree.lng.is_finite())
        .map(|tree| Point::new(tree.lng, tree.lat))
        .collect();
    debug!("Read {} trees from {}", trees.len(), path.display());
    Layer::from_features(trees)
}

fn read_feature_collection(path: &Path) -> Result<Option<FeatureCollection>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let text = fs::read_to_string(path).map_err(|e| format!("{}: {e}", path.display()))?;
    let geojson: GeoJson = text
        .parse()
        .map_err(|e| format!("{}: {e}", path.display()))?;
    FeatureCollection::try_from(geojson)
        .map(Some)
        .map_err(|e| format!("{}: {e}", path.display()))
}

fn features_layer<T>(
    path: &Path,
    mut extract: impl FnMut(Geometry<f64>, &Feature) -> Vec<T>,
) -> Layer<T> {
    let collection = match read_feature_collection(path) {
        Ok(Some(collection)) => collection,
        Ok(None) => return Layer::Absent,
        Err(reason) => return Layer::Malformed(reason),
    };

    let mut features = Vec::new();
    for feature in &collection.features {
        if let Some(geometry) = feature_geometry(feature) {
            features.extend(extract(geometry, feature));
        }
    }
    Layer::from_features(features)
}

fn feature_geometry(feature: &Feature) -> Option<Geometry<f64>> {
    let geometry = feature.geometry.clone()?;
    Geometry::<f64>::try_from(geometry).ok()
}

fn feature_height(feature: &Feature) -> Option<f64> {
    feature.property("height").and_then(json_number)
}

fn json_number(value: &JsonValue) -> Option<f64> {
    match value {
        JsonValue::Number(number) => number.as_f64(),
        JsonValue::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

/// A named place shown next to the routes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointOfInterest {
    pub name: String,
    pub category: String,
    pub lat: f64,
    pub lon: f64,
}

/// Named points of interest inside `bounds`, across all amenity layers.
///
/// Unreadable layers are skipped; unnamed features are ignored.
pub fn load_amenities(
    config: &CoolRideConfig,
    layers: &[AmenityLayer],
    bounds: &Rect<f64>,
) -> Vec<PointOfInterest> {
    let mut places = Vec::new();
    for layer in layers {
        let path = config.data_file(&layer.path);
        let collection = match read_feature_collection(&path) {
            Ok(Some(collection)) => collection,
            Ok(None) => {
                debug!("Amenity layer {} missing", path.display());
                continue;
            }
            Err(reason) => {
                warn!("Amenity layer unreadable: {reason}");
                continue;
            }
        };

        let before = places.len();
        for feature in &collection.features {
            if let Some(place) = point_of_interest(feature, &layer.category)
                && bounds.intersects(&Point::new(place.lon, place.lat))
            {
                places.push(place);
            }
        }
        info!(
            "Loaded {} {} points of interest",
            places.len() - before,
            layer.category
        );
    }
    places
}

fn point_of_interest(feature: &Feature, default_category: &str) -> Option<PointOfInterest> {
    let name = ["NAME", "name", "Name"]
        .iter()
        .find_map(|key| feature.property(key).and_then(JsonValue::as_str))
        .filter(|name| !name.is_empty() && *name != "Unknown")?
        .to_string();
    let category = feature
        .property("type")
        .and_then(JsonValue::as_str)
        .unwrap_or(default_category)
        .to_string();
    let location = match feature_geometry(feature)? {
        Geometry::Point(point) => point,
        other => other.centroid()?,
    };

    Some(PointOfInterest {
        name,
        category,
        lat: location.y(),
        lon: location.x(),
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use geo::coord;
    use tempfile::TempDir;

    use super::*;

    fn write(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn missing_file_is_absent() {
        let dir = TempDir::new().unwrap();
        assert_eq!(load_water(&dir.path().join("nope.geojson")), Layer::Absent);
        assert_eq!(load_trees(&dir.path().join("nope.csv")), Layer::Absent);
    }

    #[test]
    fn garbage_is_malformed() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "water.geojson", "{ not json");
        assert!(matches!(load_water(&path), Layer::Malformed(_)));
    }

    #[test]
    fn lfs_pointer_tree_csv_is_malformed() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "trees.csv",
            "version https://git-lfs.github.com/spec/v1\noid sha256:abc\n",
        );
        assert!(matches!(load_trees(&path), Layer::Malformed(_)));
    }

    #[test]
    fn tree_csv_rows_become_points() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "trees.csv",
            "species,lat,lng\nRain tree,1.3501,103.9402\nAngsana,bad,103.9\nTembusu,1.3502,103.9403\n",
        );
        let Layer::Loaded(trees) = load_trees(&path) else {
            panic!("expected trees");
        };
        assert_eq!(trees.len(), 2);
        assert!((trees[0].x() - 103.9402).abs() < 1e-12);
        assert!((trees[0].y() - 1.3501).abs() < 1e-12);
    }

    #[test]
    fn buildings_keep_polygons_and_heights() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "buildings.geojson",
            r#"{"type": "FeatureCollection", "features": [
                {"type": "Feature", "properties": {"height": "42"},
                 "geometry": {"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,0]]]}},
                {"type": "Feature", "properties": {},
                 "geometry": {"type": "Point", "coordinates": [0.5, 0.5]}},
                {"type": "Feature", "properties": null,
                 "geometry": {"type": "Polygon", "coordinates": [[[2,2],[3,2],[3,3],[2,2]]]}}
            ]}"#,
        );
        let Layer::Loaded(buildings) = load_buildings(&path) else {
            panic!("expected buildings");
        };
        assert_eq!(buildings.len(), 2);
        assert_eq!(buildings[0].height, Some(42.0));
        assert_eq!(buildings[1].height, None);
    }

    #[test]
    fn collection_without_matching_geometry_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "pcn.geojson",
            r#"{"type": "FeatureCollection", "features": [
                {"type": "Feature", "properties": {},
                 "geometry": {"type": "Point", "coordinates": [0.5, 0.5]}}
            ]}"#,
        );
        assert_eq!(load_park_connectors(&path), Layer::Empty);
    }

    #[test]
    fn amenities_are_named_and_inside_bounds() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            "mrt.geojson",
            r#"{"type": "FeatureCollection", "features": [
                {"type": "Feature", "properties": {"name": "Tampines"},
                 "geometry": {"type": "Point", "coordinates": [103.9451, 1.3535]}},
                {"type": "Feature", "properties": {"name": "Jurong East"},
                 "geometry": {"type": "Point", "coordinates": [103.7422, 1.3332]}},
                {"type": "Feature", "properties": {"name": "Unknown"},
                 "geometry": {"type": "Point", "coordinates": [103.9450, 1.3530]}}
            ]}"#,
        );
        let config = CoolRideConfig {
            data_dir: dir.path().to_path_buf(),
            ..CoolRideConfig::default()
        };
        let bounds = Rect::new(coord! { x: 103.93, y: 1.34 }, coord! { x: 103.96, y: 1.37 });
        let places = load_amenities(
            &config,
            &[
                AmenityLayer::new("mrt.geojson", "MRT"),
                AmenityLayer::new("missing.geojson", "Hawker"),
            ],
            &bounds,
        );
        assert_eq!(places.len(), 1);
        assert_eq!(places[0].name, "Tampines");
        assert_eq!(places[0].category, "MRT");
    }
}
