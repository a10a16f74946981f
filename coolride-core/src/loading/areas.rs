//! Selection of the pre-cached network covering a request.

use log::info;

use crate::Error;
use crate::config::{AreaConfig, CoolRideConfig};
use crate::model::RoadNetwork;
use crate::overlay::METERS_PER_DEGREE;

use super::load_network;

/// Closest catalog area whose centre lies within its radius of `(lat, lon)`.
///
/// Areas rejected by `is_cached` are skipped, so an overlapping area with a
/// network on disk is used instead. Distances are planar degrees scaled by
/// 111 km, no longitude correction.
pub fn select_area(
    areas: &[AreaConfig],
    lat: f64,
    lon: f64,
    is_cached: impl Fn(&AreaConfig) -> bool,
) -> Result<&AreaConfig, Error> {
    areas
        .iter()
        .filter(|area| is_cached(area))
        .map(|area| {
            let distance = (area.lat - lat).hypot(area.lon - lon) * METERS_PER_DEGREE;
            (area, distance)
        })
        .filter(|(area, distance)| *distance < area.radius_m)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(area, _)| area)
        .ok_or_else(|| {
            Error::GraphLoadFailure(format!("no cached network covers ({lat:.5}, {lon:.5})"))
        })
}

/// Loads the network of the area covering `(lat, lon)`.
pub fn load_area_network(
    config: &CoolRideConfig,
    lat: f64,
    lon: f64,
) -> Result<(String, RoadNetwork), Error> {
    let area = select_area(&config.areas, lat, lon, |area| {
        config.data_file(area.network_file()).is_file()
    })?;
    info!("Using cached network for area {}", area.name);
    let network = load_network(&config.data_file(area.network_file()))?;
    Ok((area.name.clone(), network))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<AreaConfig> {
        vec![
            AreaConfig::new("tampines", 1.3530, 103.9450, 2000.0),
            AreaConfig::new("pasir_ris", 1.3721, 103.9474, 2000.0),
            AreaConfig::new("orchard", 1.3048, 103.8318, 2000.0),
        ]
    }

    #[test]
    fn closest_covering_area_wins() {
        let areas = catalog();
        // Both Tampines and Pasir Ris are within 2 km; Tampines is closer.
        let area = select_area(&areas, 1.3600, 103.9460, |_| true).unwrap();
        assert_eq!(area.name, "tampines");
    }

    #[test]
    fn uncovered_point_fails_to_load() {
        let areas = catalog();
        assert!(matches!(
            select_area(&areas, 1.4400, 103.7000, |_| true),
            Err(Error::GraphLoadFailure(_))
        ));
    }

    #[test]
    fn uncached_areas_are_skipped() {
        let areas = catalog();
        let area = select_area(&areas, 1.3600, 103.9460, |area| area.name != "tampines").unwrap();
        assert_eq!(area.name, "pasir_ris");
    }

    #[test]
    fn farther_cached_area_is_loaded() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("far_network.json"),
            r#"{"nodes": [{"id": 1, "lon": 103.94, "lat": 1.351},
                          {"id": 2, "lon": 103.941, "lat": 1.351}],
                "edges": [{"u": 1, "v": 2, "length": 111.0}]}"#,
        )
        .unwrap();
        let config = CoolRideConfig {
            data_dir: dir.path().to_path_buf(),
            areas: vec![
                AreaConfig::new("near", 1.3500, 103.9400, 2000.0),
                AreaConfig::new("far", 1.3550, 103.9400, 2000.0),
            ],
            ..CoolRideConfig::default()
        };

        let (name, network) = load_area_network(&config, 1.3501, 103.9400).unwrap();
        assert_eq!(name, "far");
        assert_eq!(network.node_count(), 2);
    }

    #[test]
    fn missing_network_file_is_load_failure() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = CoolRideConfig {
            data_dir: dir.path().to_path_buf(),
            areas: catalog(),
            ..CoolRideConfig::default()
        };
        assert!(matches!(
            load_area_network(&config, 1.3530, 103.9450),
            Err(Error::GraphLoadFailure(_))
        ));
    }
}
