//! Directed road multigraph with a planar spatial index

use geo::{BoundingRect, Coord, LineString, MultiPoint, Point, Rect};
use hashbrown::HashMap;
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use rstar::{RTree, primitives::GeomWithData};

use super::{RoadEdge, RoadNode};
use crate::{Error, NodeId};

pub type RoadGraph = DiGraph<RoadNode, RoadEdge>;

/// R-tree entry: `[lon, lat]` of a graph node
pub type IndexedPoint = GeomWithData<[f64; 2], NodeIndex>;

/// Road network loaded for a single route computation.
///
/// The graph is a multigraph: any number of parallel edges may connect the
/// same ordered node pair. Nearest-node queries are planar in lon/lat space.
#[derive(Debug, Clone, Default)]
pub struct RoadNetwork {
    pub graph: RoadGraph,
    rtree: RTree<IndexedPoint>,
    node_lookup: HashMap<NodeId, NodeIndex>,
}

impl RoadNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Adds a node, or returns the existing index when `id` is already known.
    pub fn add_node(&mut self, id: NodeId, lon: f64, lat: f64) -> NodeIndex {
        if let Some(&index) = self.node_lookup.get(&id) {
            return index;
        }
        let index = self.graph.add_node(RoadNode {
            id,
            geometry: Point::new(lon, lat),
        });
        self.rtree.insert(IndexedPoint::new([lon, lat], index));
        self.node_lookup.insert(id, index);
        index
    }

    /// Adds a directed edge between two previously added nodes.
    pub fn add_edge(
        &mut self,
        from: NodeId,
        to: NodeId,
        key: u32,
        length: f64,
        geometry: Option<LineString<f64>>,
    ) -> Result<EdgeIndex, Error> {
        if !length.is_finite() || length < 0.0 {
            return Err(Error::InvalidData(format!(
                "edge {from}->{to} has invalid length {length}"
            )));
        }
        let source = self.node_index(from).ok_or_else(|| {
            Error::InvalidData(format!("edge {from}->{to} references unknown node {from}"))
        })?;
        let target = self.node_index(to).ok_or_else(|| {
            Error::InvalidData(format!("edge {from}->{to} references unknown node {to}"))
        })?;
        Ok(self
            .graph
            .add_edge(source, target, RoadEdge::new(key, length, geometry)))
    }

    pub fn node_index(&self, id: NodeId) -> Option<NodeIndex> {
        self.node_lookup.get(&id).copied()
    }

    pub fn node(&self, index: NodeIndex) -> Option<&RoadNode> {
        self.graph.node_weight(index)
    }

    pub fn edge(&self, index: EdgeIndex) -> Option<&RoadEdge> {
        self.graph.edge_weight(index)
    }

    /// Source IDs of a sequence of node indices
    pub fn node_ids(&self, path: &[NodeIndex]) -> Vec<NodeId> {
        path.iter()
            .filter_map(|&index| self.node(index).map(|node| node.id))
            .collect()
    }

    /// Nearest node by planar (lon/lat Euclidean) distance.
    pub fn nearest_node(&self, point: &Point<f64>) -> Option<NodeIndex> {
        self.rtree
            .nearest_neighbor(&[point.x(), point.y()])
            .map(|entry| entry.data)
    }

    /// Bounding box of all nodes
    pub fn bounds(&self) -> Option<Rect<f64>> {
        let nodes: MultiPoint<f64> = self
            .graph
            .node_weights()
            .map(|node| node.geometry)
            .collect();
        nodes.bounding_rect()
    }

    /// Centreline of an edge: its stored geometry, or the straight segment
    /// between its endpoints.
    pub fn edge_line(&self, index: EdgeIndex) -> Option<LineString<f64>> {
        if let Some(geometry) = self.edge(index).and_then(|edge| edge.geometry.as_ref()) {
            return Some(geometry.clone());
        }
        let (source, target) = self.graph.edge_endpoints(index)?;
        let from: Coord<f64> = self.node(source)?.geometry.into();
        let to: Coord<f64> = self.node(target)?.geometry.into();
        Some(LineString::new(vec![from, to]))
    }

    /// Assigns the thermal cost of an edge. Each edge is annotated once.
    pub fn set_cool_cost(&mut self, index: EdgeIndex, cost: f64) -> Result<(), Error> {
        let edge = self
            .graph
            .edge_weight_mut(index)
            .ok_or_else(|| Error::InvalidData(format!("unknown edge {}", index.index())))?;
        if edge.set_cool_cost(cost) {
            Ok(())
        } else {
            Err(Error::AlreadyAnnotated(index.index()))
        }
    }

    /// `true` once every edge carries a cool cost.
    pub fn is_annotated(&self) -> bool {
        self.graph
            .edge_weights()
            .all(|edge| edge.cool_cost().is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> RoadNetwork {
        let mut network = RoadNetwork::new();
        network.add_node(1, 103.90, 1.30);
        network.add_node(2, 103.91, 1.30);
        network.add_node(3, 103.91, 1.31);
        network.add_edge(1, 2, 0, 1100.0, None).unwrap();
        network.add_edge(2, 3, 0, 1100.0, None).unwrap();
        network
    }

    #[test]
    fn nearest_node_is_planar() {
        let network = triangle();
        let index = network
            .nearest_node(&Point::new(103.9095, 1.3002))
            .unwrap();
        assert_eq!(network.node(index).unwrap().id, 2);
    }

    #[test]
    fn duplicate_node_ids_are_merged() {
        let mut network = triangle();
        let again = network.add_node(1, 0.0, 0.0);
        assert_eq!(network.node_index(1), Some(again));
        assert_eq!(network.node_count(), 3);
    }

    #[test]
    fn rejects_dangling_and_negative_edges() {
        let mut network = triangle();
        assert!(network.add_edge(1, 9, 0, 10.0, None).is_err());
        assert!(network.add_edge(1, 3, 0, -1.0, None).is_err());
    }

    #[test]
    fn straight_line_fallback_for_missing_geometry() {
        let network = triangle();
        let line = network.edge_line(EdgeIndex::new(0)).unwrap();
        assert_eq!(line.0.len(), 2);
        assert!((line.0[0].x - 103.90).abs() < 1e-12);
        assert!((line.0[1].x - 103.91).abs() < 1e-12);
    }

    #[test]
    fn cool_cost_is_assigned_once() {
        let mut network = triangle();
        let edge = EdgeIndex::new(0);
        network.set_cool_cost(edge, 660.0).unwrap();
        assert!(matches!(
            network.set_cool_cost(edge, 1.0),
            Err(Error::AlreadyAnnotated(0))
        ));
        assert_eq!(network.edge(edge).unwrap().cool_cost(), Some(660.0));
        assert!(!network.is_annotated());
    }

    #[test]
    fn bounds_cover_all_nodes() {
        let rect = triangle().bounds().unwrap();
        assert!((rect.min().x - 103.90).abs() < 1e-12);
        assert!((rect.max().y - 1.31).abs() < 1e-12);
    }
}
