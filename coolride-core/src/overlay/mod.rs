//! Thermal overlays tested against road edges.
//!
//! Four categories are built per request: park-connector corridor, tree
//! shade buffer, building shadow union and water buffer. A category that
//! could not be built is [`OverlayRegion::NoConstraint`] and never matches.

mod builder;
pub mod projection;
pub mod region;

use std::fmt;

use geo::{LineString, MultiPolygon, Polygon};
use serde::Serialize;

pub use builder::{OverlayBuilder, RawLayers};
pub use projection::{LocalProjection, METERS_PER_DEGREE};
pub use region::IndexedRegion;

/// Load result of one raw vector layer.
///
/// `Absent` and `Empty` degrade the overlay silently, `Malformed` keeps the
/// reason around for diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub enum Layer<T> {
    Absent,
    Empty,
    Malformed(String),
    Loaded(Vec<T>),
}

impl<T> Layer<T> {
    pub fn from_features(features: Vec<T>) -> Self {
        if features.is_empty() {
            Layer::Empty
        } else {
            Layer::Loaded(features)
        }
    }

    /// Keeps only matching features; dropping all of them makes the layer empty.
    pub fn filter(self, predicate: impl FnMut(&T) -> bool) -> Self {
        match self {
            Layer::Loaded(features) => {
                Layer::from_features(features.into_iter().filter(predicate).collect())
            }
            other => other,
        }
    }

    pub fn features(&self) -> &[T] {
        match self {
            Layer::Loaded(features) => features,
            _ => &[],
        }
    }

    /// Status for a layer that could not be turned into an overlay.
    pub fn status(&self) -> LayerStatus {
        match self {
            Layer::Absent => LayerStatus::Absent,
            Layer::Empty => LayerStatus::Empty,
            Layer::Malformed(reason) => LayerStatus::Malformed {
                reason: reason.clone(),
            },
            Layer::Loaded(features) => LayerStatus::Applied {
                features: features.len(),
            },
        }
    }
}

impl<T> Default for Layer<T> {
    fn default() -> Self {
        Layer::Absent
    }
}

/// What became of one overlay category during a request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LayerStatus {
    Applied { features: usize },
    Absent,
    Empty,
    Malformed { reason: String },
    /// Shadows only: the sun is at or below the horizon.
    SunBelowHorizon,
}

impl LayerStatus {
    pub fn is_applied(&self) -> bool {
        matches!(self, LayerStatus::Applied { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayKind {
    ParkConnector,
    Tree,
    Shadow,
    Water,
}

impl fmt::Display for OverlayKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OverlayKind::ParkConnector => "park connector",
            OverlayKind::Tree => "tree shade",
            OverlayKind::Shadow => "building shadow",
            OverlayKind::Water => "water",
        };
        f.write_str(name)
    }
}

/// One unioned overlay in geographic coordinates.
#[derive(Debug, Clone, Default)]
pub enum OverlayRegion {
    /// Category unavailable: matches nothing.
    #[default]
    NoConstraint,
    Area(IndexedRegion<Polygon<f64>>),
    /// Unbuffered lines, matched on contact.
    Corridor(IndexedRegion<LineString<f64>>),
}

impl OverlayRegion {
    pub fn area(region: MultiPolygon<f64>) -> Self {
        if region.0.is_empty() {
            OverlayRegion::NoConstraint
        } else {
            OverlayRegion::Area(IndexedRegion::new(region.0))
        }
    }

    pub fn corridor(lines: Vec<LineString<f64>>) -> Self {
        if lines.is_empty() {
            OverlayRegion::NoConstraint
        } else {
            OverlayRegion::Corridor(IndexedRegion::new(lines))
        }
    }

    pub fn is_constrained(&self) -> bool {
        !matches!(self, OverlayRegion::NoConstraint)
    }

    pub fn intersects(&self, line: &LineString<f64>) -> bool {
        match self {
            OverlayRegion::NoConstraint => false,
            OverlayRegion::Area(region) => region.intersects_line(line),
            OverlayRegion::Corridor(region) => region.intersects_line(line),
        }
    }
}

/// Overlay membership of a single edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OverlayHits {
    pub park_connector: bool,
    pub tree: bool,
    pub shadow: bool,
    pub water: bool,
}

/// Per-category outcome, exposed with every route response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayReport {
    pub park_connector: LayerStatus,
    pub tree: LayerStatus,
    pub shadow: LayerStatus,
    pub water: LayerStatus,
}

impl OverlayReport {
    pub fn status(&self, kind: OverlayKind) -> &LayerStatus {
        match kind {
            OverlayKind::ParkConnector => &self.park_connector,
            OverlayKind::Tree => &self.tree,
            OverlayKind::Shadow => &self.shadow,
            OverlayKind::Water => &self.water,
        }
    }

    /// Categories that actually constrain edges in this request.
    pub fn applied(&self) -> Vec<OverlayKind> {
        [
            OverlayKind::ParkConnector,
            OverlayKind::Tree,
            OverlayKind::Shadow,
            OverlayKind::Water,
        ]
        .into_iter()
        .filter(|kind| self.status(*kind).is_applied())
        .collect()
    }
}

impl Default for OverlayReport {
    fn default() -> Self {
        Self {
            park_connector: LayerStatus::Absent,
            tree: LayerStatus::Absent,
            shadow: LayerStatus::Absent,
            water: LayerStatus::Absent,
        }
    }
}

/// All overlays of one request.
#[derive(Debug, Clone, Default)]
pub struct OverlaySet {
    pub park_connector: OverlayRegion,
    pub tree: OverlayRegion,
    pub shadow: OverlayRegion,
    pub water: OverlayRegion,
    pub report: OverlayReport,
}

impl OverlaySet {
    /// No overlays at all: every edge keeps its plain length.
    pub fn unconstrained() -> Self {
        Self::default()
    }

    pub fn region(&self, kind: OverlayKind) -> &OverlayRegion {
        match kind {
            OverlayKind::ParkConnector => &self.park_connector,
            OverlayKind::Tree => &self.tree,
            OverlayKind::Shadow => &self.shadow,
            OverlayKind::Water => &self.water,
        }
    }

    pub fn hits(&self, line: &LineString<f64>) -> OverlayHits {
        OverlayHits {
            park_connector: self.park_connector.intersects(line),
            tree: self.tree.intersects(line),
            shadow: self.shadow.intersects(line),
            water: self.water.intersects(line),
        }
    }
}
