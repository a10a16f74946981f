use geo::algorithm::bool_ops::unary_union;
use geo::{Centroid, ConvexHull, MultiPolygon, Polygon, Translate};
use log::debug;

use super::{Building, SunPosition};
use crate::overlay::METERS_PER_DEGREE;

/// Approximate shadow of one building footprint, in geographic coordinates.
///
/// The footprint is translated away from the sun by `height / tan(elevation)`
/// metres and the shadow is the convex hull of the footprint and its
/// translated copy. This is a deliberate approximation of the swept shadow,
/// not a projected silhouette. Returns `None` while the sun is at or below
/// the horizon.
pub fn cast_shadow(
    footprint: &Polygon<f64>,
    height: f64,
    elevation: f64,
    azimuth: f64,
) -> Option<Polygon<f64>> {
    if elevation <= 0.0 {
        return None;
    }

    let shadow_length = height / elevation.to_radians().tan();
    let direction = ((azimuth + 180.0) % 360.0).to_radians();
    let offset_north = shadow_length * direction.cos();
    let offset_east = shadow_length * direction.sin();

    let lat = footprint.centroid()?.y();
    let offset_lat = offset_north / METERS_PER_DEGREE;
    let offset_lon = offset_east / (METERS_PER_DEGREE * lat.to_radians().cos());

    let translated = footprint.translate(offset_lon, offset_lat);
    Some(MultiPolygon::new(vec![footprint.clone(), translated]).convex_hull())
}

/// Union of the shadows of all buildings.
///
/// Buildings without a usable height fall back to `default_height`. Returns
/// an empty region at night.
pub fn cast_building_shadows(
    buildings: &[Building],
    default_height: f64,
    sun: &SunPosition,
) -> MultiPolygon<f64> {
    if !sun.is_above_horizon() {
        return MultiPolygon::new(vec![]);
    }

    let shadows: Vec<Polygon<f64>> = buildings
        .iter()
        .filter_map(|building| {
            cast_shadow(
                &building.footprint,
                building.height_or(default_height),
                sun.elevation,
                sun.azimuth,
            )
        })
        .collect();
    debug!("Cast {} building shadows", shadows.len());

    unary_union(shadows.iter())
}

#[cfg(test)]
mod tests {
    use geo::{Area, BoundingRect, polygon};

    use super::*;

    fn footprint() -> Polygon<f64> {
        polygon![
            (x: 103.9000, y: 1.3500),
            (x: 103.9001, y: 1.3500),
            (x: 103.9001, y: 1.3501),
            (x: 103.9000, y: 1.3501),
        ]
    }

    #[test]
    fn no_shadow_below_horizon() {
        assert!(cast_shadow(&footprint(), 15.0, 0.0, 90.0).is_none());
        assert!(cast_shadow(&footprint(), 15.0, -12.0, 90.0).is_none());
    }

    #[test]
    fn morning_sun_in_the_east_casts_west() {
        // 45 degrees elevation: shadow length equals the building height.
        let shadow = cast_shadow(&footprint(), 111.0, 45.0, 90.0).unwrap();
        let rect = shadow.bounding_rect().unwrap();
        let lon_per_m = 1.0 / (METERS_PER_DEGREE * 1.35005_f64.to_radians().cos());
        assert!((rect.min().x - (103.9000 - 111.0 * lon_per_m)).abs() < 1e-7);
        assert!((rect.max().x - 103.9001).abs() < 1e-9);
        assert!((rect.min().y - 1.3500).abs() < 1e-9);
    }

    #[test]
    fn shadow_contains_the_footprint() {
        let shadow = cast_shadow(&footprint(), 15.0, 60.0, 200.0).unwrap();
        assert!(shadow.unsigned_area() >= footprint().unsigned_area());
    }

    #[test]
    fn overlapping_shadows_are_unioned() {
        let sun = SunPosition {
            elevation: 45.0,
            azimuth: 90.0,
        };
        let buildings = vec![
            Building::new(footprint(), None),
            Building::new(footprint().translate(0.00005, 0.0), Some(30.0)),
        ];
        let union = cast_building_shadows(&buildings, 15.0, &sun);
        assert_eq!(union.0.len(), 1);
    }

    #[test]
    fn night_gives_empty_union() {
        let sun = SunPosition {
            elevation: -5.0,
            azimuth: 270.0,
        };
        let union = cast_building_shadows(&[Building::new(footprint(), None)], 15.0, &sun);
        assert!(union.0.is_empty());
    }
}
