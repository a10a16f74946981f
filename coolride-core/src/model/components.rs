//! Road network components - nodes and edges

use geo::{LineString, Point};

use crate::NodeId;

/// Road graph node
#[derive(Debug, Clone)]
pub struct RoadNode {
    /// Source ID of the node (OSM id in the cached networks)
    pub id: NodeId,
    /// Node coordinates (lon, lat)
    pub geometry: Point<f64>,
}

/// Road graph edge (directed street segment)
///
/// Parallel edges between the same node pair are told apart by `key`.
#[derive(Debug, Clone)]
pub struct RoadEdge {
    pub key: u32,
    /// Length in metres
    pub length: f64,
    /// Optional centreline; a straight segment between the endpoints otherwise
    pub geometry: Option<LineString<f64>>,
    cool_cost: Option<f64>,
}

impl RoadEdge {
    pub fn new(key: u32, length: f64, geometry: Option<LineString<f64>>) -> Self {
        Self {
            key,
            length,
            geometry,
            cool_cost: None,
        }
    }

    /// Thermal cost, available once the edge has been annotated.
    pub fn cool_cost(&self) -> Option<f64> {
        self.cool_cost
    }

    /// Returns `false` when the edge was already annotated.
    pub(crate) fn set_cool_cost(&mut self, cost: f64) -> bool {
        if self.cool_cost.is_some() {
            return false;
        }
        self.cool_cost = Some(cost);
        true
    }
}
