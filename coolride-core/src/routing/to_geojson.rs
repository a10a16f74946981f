use geo::{Coord, LineString};
use geojson::{Feature, FeatureCollection, Geometry, Value as GeoJsonValue};
use serde_json::json;

use super::dual::{DualRoute, RoutePath};
use crate::Error;

impl DualRoute {
    /// Both routes as `GeoJSON` line features, fast first.
    pub fn to_geojson(&self) -> Result<FeatureCollection, Error> {
        let features = vec![
            route_feature(&self.fast, "fast", self.similarity)?,
            route_feature(&self.cool, "cool", self.similarity)?,
        ];
        Ok(FeatureCollection {
            features,
            bbox: None,
            foreign_members: None,
        })
    }

    pub fn to_geojson_string(&self) -> Result<String, Error> {
        serde_json::to_string(&self.to_geojson()?).map_err(|e| Error::GeoJsonError(e.to_string()))
    }
}

fn route_feature(route: &RoutePath, kind: &str, similarity: f64) -> Result<Feature, Error> {
    let line: LineString<f64> = route
        .coordinates
        .iter()
        .map(|&[x, y]| Coord { x, y })
        .collect();
    let geometry = Geometry::new(GeoJsonValue::from(&line));

    let value = json!({
        "type": "Feature",
        "geometry": geometry,
        "properties": {
            "route": kind,
            "length_m": route.length_m,
            "cool_cost": route.cool_cost,
            "nodes": route.nodes.len(),
            "similarity": similarity,
        }
    });

    serde_json::from_value::<Feature>(value).map_err(|e| Error::GeoJsonError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_become_line_features() {
        let route = RoutePath {
            nodes: vec![1, 2],
            coordinates: vec![[103.94, 1.35], [103.941, 1.35]],
            length_m: 111.0,
            cool_cost: 66.6,
        };
        let dual = DualRoute {
            fast: route.clone(),
            cool: route,
            similarity: 1.0,
        };
        let collection = dual.to_geojson().unwrap();
        assert_eq!(collection.features.len(), 2);
        assert_eq!(
            collection.features[1].property("route"),
            Some(&json!("cool"))
        );

        let text = dual.to_geojson_string().unwrap();
        assert!(text.contains("LineString"));
    }
}
