use geo::{Buffer, Intersects, LineString, MultiPoint, MultiPolygon, Point, Polygon, Rect};
use log::{info, warn};

use super::{Layer, LayerStatus, LocalProjection, OverlayRegion, OverlayReport, OverlaySet};
use crate::config::OverlayConfig;
use crate::shadow::{Building, SunPosition, cast_building_shadows};

/// Raw vector layers in geographic coordinates, as loaded for one request.
#[derive(Debug, Clone, Default)]
pub struct RawLayers {
    pub park_connectors: Layer<LineString<f64>>,
    pub trees: Layer<Point<f64>>,
    pub buildings: Layer<Building>,
    pub water: Layer<Polygon<f64>>,
}

/// Turns raw layers into the four overlay regions of a request.
///
/// Buffers are computed in a local metric projection centred on the network
/// and projected back to geographic coordinates. Nothing in here fails: a
/// layer that cannot be used becomes [`OverlayRegion::NoConstraint`] and its
/// reason is recorded in the [`OverlayReport`].
pub struct OverlayBuilder<'a> {
    config: &'a OverlayConfig,
    bounds: Rect<f64>,
    projection: LocalProjection,
}

impl<'a> OverlayBuilder<'a> {
    pub fn new(config: &'a OverlayConfig, bounds: Rect<f64>) -> Self {
        Self {
            config,
            bounds,
            projection: LocalProjection::centered_on(&bounds),
        }
    }

    pub fn build(&self, layers: RawLayers, sun: &SunPosition) -> OverlaySet {
        let (park_connector, park_status) = self.park_connectors(layers.park_connectors);
        let (tree, tree_status) = self.trees(layers.trees);
        let (shadow, shadow_status) = self.shadows(layers.buildings, sun);
        let (water, water_status) = self.water(layers.water);

        OverlaySet {
            park_connector,
            tree,
            shadow,
            water,
            report: OverlayReport {
                park_connector: park_status,
                tree: tree_status,
                shadow: shadow_status,
                water: water_status,
            },
        }
    }

    fn park_connectors(&self, layer: Layer<LineString<f64>>) -> (OverlayRegion, LayerStatus) {
        let layer = layer.filter(|line| self.bounds.intersects(line));
        let lines = match layer {
            Layer::Loaded(lines) => lines,
            other => {
                log_unavailable("Park connectors", &other);
                return (OverlayRegion::NoConstraint, other.status());
            }
        };
        info!("Park connector corridor ({} segments)", lines.len());
        let status = LayerStatus::Applied {
            features: lines.len(),
        };
        (OverlayRegion::corridor(lines), status)
    }

    fn trees(&self, layer: Layer<Point<f64>>) -> (OverlayRegion, LayerStatus) {
        let layer = layer.filter(|tree| self.bounds.intersects(tree));
        let trees = match layer {
            Layer::Loaded(trees) => trees,
            other => {
                log_unavailable("Tree shade", &other);
                return (OverlayRegion::NoConstraint, other.status());
            }
        };
        let count = trees.len();
        let metric = self.projection.to_metric(&MultiPoint::new(trees));
        let region = self.unproject(metric.buffer(self.config.tree_buffer_m));
        info!("Tree shade ({count} trees)");
        (
            OverlayRegion::area(region),
            LayerStatus::Applied { features: count },
        )
    }

    fn water(&self, layer: Layer<Polygon<f64>>) -> (OverlayRegion, LayerStatus) {
        let layer = layer.filter(|body| self.bounds.intersects(body));
        let bodies = match layer {
            Layer::Loaded(bodies) => bodies,
            other => {
                log_unavailable("Water cooling", &other);
                return (OverlayRegion::NoConstraint, other.status());
            }
        };
        let count = bodies.len();
        let metric = self.projection.to_metric(&MultiPolygon::new(bodies));
        let region = self.unproject(metric.buffer(self.config.water_buffer_m));
        info!("Water cooling ({count} features)");
        (
            OverlayRegion::area(region),
            LayerStatus::Applied { features: count },
        )
    }

    fn shadows(&self, layer: Layer<Building>, sun: &SunPosition) -> (OverlayRegion, LayerStatus) {
        let layer = layer.filter(|building| self.bounds.intersects(&building.footprint));
        let buildings = match layer {
            Layer::Loaded(buildings) => buildings,
            other => {
                log_unavailable("Building shadows", &other);
                return (OverlayRegion::NoConstraint, other.status());
            }
        };
        if !sun.is_above_horizon() {
            info!("Sun below horizon, no building shadows");
            return (OverlayRegion::NoConstraint, LayerStatus::SunBelowHorizon);
        }
        let union = cast_building_shadows(&buildings, self.config.building_height_m, sun);
        info!("Building shadows generated ({} buildings)", buildings.len());
        (
            OverlayRegion::area(union),
            LayerStatus::Applied {
                features: buildings.len(),
            },
        )
    }

    fn unproject(&self, metric: MultiPolygon<f64>) -> MultiPolygon<f64> {
        self.projection.to_geographic(&metric)
    }
}

fn log_unavailable<T>(name: &str, layer: &Layer<T>) {
    match layer {
        Layer::Malformed(reason) => warn!("{name} layer is malformed: {reason}"),
        Layer::Empty => info!("{name}: no features in this area"),
        _ => warn!("{name} data missing (skipping)"),
    }
}
