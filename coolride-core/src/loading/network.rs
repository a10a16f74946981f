//! Road network documents
//!
//! A network file is a JSON object with node and edge lists, as exported
//! from the cached bike networks:
//!
//! ```json
//! {"nodes": [{"id": 1, "lon": 103.94, "lat": 1.35}],
//!  "edges": [{"u": 1, "v": 2, "key": 0, "length": 84.2,
//!             "geometry": [[103.94, 1.35], [103.941, 1.351]]}]}
//! ```

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use geo::{Coord, LineString};
use log::{info, warn};
use serde::Deserialize;

use crate::{Error, NodeId, model::RoadNetwork};

#[derive(Debug, Deserialize)]
pub struct NetworkDocument {
    pub nodes: Vec<RawNode>,
    pub edges: Vec<RawEdge>,
}

#[derive(Debug, Deserialize)]
pub struct RawNode {
    pub id: NodeId,
    pub lon: f64,
    pub lat: f64,
}

#[derive(Debug, Deserialize)]
pub struct RawEdge {
    pub u: NodeId,
    pub v: NodeId,
    #[serde(default)]
    pub key: u32,
    pub length: f64,
    #[serde(default)]
    pub geometry: Option<Vec<[f64; 2]>>,
}

/// Reads and validates a network file.
///
/// # Errors
///
/// Any failure is reported as [`Error::GraphLoadFailure`]; without a network
/// no route can be produced.
pub fn load_network(path: &Path) -> Result<RoadNetwork, Error> {
    info!("Loading road network from {}", path.display());
    let file = File::open(path).map_err(|e| {
        Error::GraphLoadFailure(format!("failed to open '{}': {e}", path.display()))
    })?;
    let document: NetworkDocument = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| Error::GraphLoadFailure(format!("'{}': {e}", path.display())))?;
    let network = network_from_document(document)?;
    info!(
        "Network loaded ({} nodes, {} edges)",
        network.node_count(),
        network.edge_count()
    );
    Ok(network)
}

/// Builds a [`RoadNetwork`] from an in-memory document.
pub fn network_from_document(document: NetworkDocument) -> Result<RoadNetwork, Error> {
    if document.nodes.is_empty() {
        return Err(Error::GraphLoadFailure("network has no nodes".to_string()));
    }

    let mut network = RoadNetwork::new();
    for node in &document.nodes {
        if !node.lon.is_finite() || !node.lat.is_finite() {
            return Err(Error::GraphLoadFailure(format!(
                "node {} has invalid coordinates",
                node.id
            )));
        }
        network.add_node(node.id, node.lon, node.lat);
    }

    for edge in document.edges {
        let geometry = edge.geometry.and_then(|coords| {
            if coords.len() < 2 {
                warn!(
                    "Edge {}->{} has a degenerate geometry, using its endpoints",
                    edge.u, edge.v
                );
                return None;
            }
            Some(LineString::new(
                coords.into_iter().map(|[x, y]| Coord { x, y }).collect(),
            ))
        });
        network
            .add_edge(edge.u, edge.v, edge.key, edge.length, geometry)
            .map_err(|e| Error::GraphLoadFailure(e.to_string()))?;
    }

    Ok(network)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<RoadNetwork, Error> {
        network_from_document(serde_json::from_str(json).unwrap())
    }

    #[test]
    fn parallel_edges_are_kept() {
        let network = parse(
            r#"{"nodes": [{"id": 1, "lon": 0.0, "lat": 0.0}, {"id": 2, "lon": 0.001, "lat": 0.0}],
                "edges": [{"u": 1, "v": 2, "key": 0, "length": 120.0},
                          {"u": 1, "v": 2, "key": 1, "length": 111.0,
                           "geometry": [[0.0, 0.0], [0.0005, 0.0001], [0.001, 0.0]]}]}"#,
        )
        .unwrap();
        assert_eq!(network.edge_count(), 2);
        let keys: Vec<u32> = network.graph.edge_weights().map(|e| e.key).collect();
        assert_eq!(keys, vec![0, 1]);
    }

    #[test]
    fn unknown_node_is_a_load_failure() {
        let result = parse(
            r#"{"nodes": [{"id": 1, "lon": 0.0, "lat": 0.0}],
                "edges": [{"u": 1, "v": 7, "length": 5.0}]}"#,
        );
        assert!(matches!(result, Err(Error::GraphLoadFailure(_))));
    }

    #[test]
    fn empty_network_is_a_load_failure() {
        assert!(matches!(
            parse(r#"{"nodes": [], "edges": []}"#),
            Err(Error::GraphLoadFailure(_))
        ));
    }

    #[test]
    fn missing_file_is_a_load_failure() {
        assert!(matches!(
            load_network(Path::new("/nonexistent/coolride/network.json")),
            Err(Error::GraphLoadFailure(_))
        ));
    }
}
