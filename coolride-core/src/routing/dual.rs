//! Fast and cool routes between the same pair of points.

use geo::{Coord, Point};
use hashbrown::HashSet;
use log::{debug, info};
use petgraph::graph::{EdgeIndex, NodeIndex};
use serde::Serialize;

use super::dijkstra::{TracedPath, shortest_path};
use crate::model::RoadNetwork;
use crate::{Error, NodeId};

/// Routes whose node sets overlap more than this are shown as one.
pub const INTERCHANGEABLE_SIMILARITY: f64 = 0.90;

/// One computed route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutePath {
    /// Source node IDs from origin to destination
    pub nodes: Vec<NodeId>,
    /// Route polyline as `[lon, lat]` pairs
    pub coordinates: Vec<[f64; 2]>,
    /// Summed length of the traversed edges, metres
    pub length_m: f64,
    /// Summed thermal cost of the traversed edges
    pub cool_cost: f64,
}

impl RoutePath {
    fn from_traced(network: &RoadNetwork, path: &TracedPath) -> Self {
        let mut length_m = 0.0;
        let mut cool_cost = 0.0;
        for edge in path.edges.iter().filter_map(|&e| network.edge(e)) {
            length_m += edge.length;
            cool_cost += edge.cool_cost().unwrap_or(edge.length);
        }

        Self {
            nodes: network.node_ids(&path.nodes),
            coordinates: route_coordinates(network, &path.nodes, &path.edges),
            length_m,
            cool_cost,
        }
    }

    /// Riding time in seconds at `speed_kmh`.
    pub fn duration_secs(&self, speed_kmh: f64) -> f64 {
        if speed_kmh <= 0.0 {
            return 0.0;
        }
        self.length_m * 3.6 / speed_kmh
    }
}

fn route_coordinates(
    network: &RoadNetwork,
    nodes: &[NodeIndex],
    edges: &[EdgeIndex],
) -> Vec<[f64; 2]> {
    let mut coords: Vec<Coord<f64>> = Vec::new();
    for &edge in edges {
        let Some(line) = network.edge_line(edge) else {
            continue;
        };
        for coord in line.0 {
            if coords.last() != Some(&coord) {
                coords.push(coord);
            }
        }
    }
    if coords.is_empty()
        && let Some(node) = nodes.first().and_then(|&n| network.node(n))
    {
        coords.push(node.geometry.into());
    }
    coords.into_iter().map(|c| [c.x, c.y]).collect()
}

/// Result of the dual-path search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DualRoute {
    /// Minimizes length
    pub fast: RoutePath,
    /// Minimizes cool cost
    pub cool: RoutePath,
    /// Jaccard similarity of the two node sets
    pub similarity: f64,
}

impl DualRoute {
    pub fn is_interchangeable(&self) -> bool {
        self.similarity > INTERCHANGEABLE_SIMILARITY
    }

    /// Percentage of the routes that differ, truncated.
    pub fn shade_gain(&self) -> u32 {
        ((1.0 - self.similarity) * 100.0).floor().max(0.0) as u32
    }
}

/// Jaccard similarity `|A ∩ B| / |A ∪ B|` over node sets.
pub fn jaccard(a: &[NodeId], b: &[NodeId]) -> f64 {
    let a: HashSet<NodeId> = a.iter().copied().collect();
    let b: HashSet<NodeId> = b.iter().copied().collect();
    let union = a.union(&b).count();
    if union == 0 {
        return 1.0;
    }
    a.intersection(&b).count() as f64 / union as f64
}

/// Snaps both points to their nearest nodes and runs Dijkstra by length and
/// by cool cost. The network must be fully annotated.
pub fn solve_dual(
    network: &RoadNetwork,
    origin: &Point<f64>,
    destination: &Point<f64>,
) -> Result<DualRoute, Error> {
    if !network.is_annotated() {
        return Err(Error::InvalidData(
            "road network has edges without a cool cost".to_string(),
        ));
    }

    let start = network.nearest_node(origin).ok_or(Error::NoPointsFound)?;
    let target = network
        .nearest_node(destination)
        .ok_or(Error::NoPointsFound)?;
    let unreachable = || Error::RouteUnreachable {
        from: network.node(start).map_or(0, |n| n.id),
        to: network.node(target).map_or(0, |n| n.id),
    };
    debug!(
        "Snapped to nodes {:?} -> {:?}",
        network.node(start).map(|n| n.id),
        network.node(target).map(|n| n.id)
    );

    let fast = shortest_path(&network.graph, start, target, |edge| edge.length)
        .ok_or_else(unreachable)?;
    let cool = shortest_path(&network.graph, start, target, |edge| {
        edge.cool_cost().unwrap_or(edge.length)
    })
    .ok_or_else(unreachable)?;

    let fast = RoutePath::from_traced(network, &fast);
    let cool = RoutePath::from_traced(network, &cool);
    let similarity = jaccard(&fast.nodes, &cool.nodes);
    info!(
        "Fast route {:.0} m, cool route {:.0} m, similarity {:.1}%",
        fast.length_m,
        cool.length_m,
        similarity * 100.0
    );

    Ok(DualRoute {
        fast,
        cool,
        similarity,
    })
}

/// Formats seconds as `m:ss`.
pub fn format_minutes(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jaccard_bounds_and_symmetry() {
        assert_eq!(jaccard(&[1, 2, 3], &[1, 2, 3]), 1.0);
        assert_eq!(jaccard(&[1, 2], &[3, 4]), 0.0);
        let ab = jaccard(&[1, 2, 3, 4], &[1, 4, 5]);
        let ba = jaccard(&[1, 4, 5], &[1, 2, 3, 4]);
        assert_eq!(ab, ba);
        assert!((ab - 0.4).abs() < 1e-12);
    }

    #[test]
    fn shade_gain_truncates() {
        let route = RoutePath {
            nodes: vec![],
            coordinates: vec![],
            length_m: 0.0,
            cool_cost: 0.0,
        };
        let dual = DualRoute {
            fast: route.clone(),
            cool: route,
            similarity: 0.4,
        };
        assert_eq!(dual.shade_gain(), 60);
        assert!(!dual.is_interchangeable());
    }

    #[test]
    fn durations_at_cycling_speed() {
        let route = RoutePath {
            nodes: vec![],
            coordinates: vec![],
            length_m: 1000.0,
            cool_cost: 1000.0,
        };
        assert!((route.duration_secs(15.0) - 240.0).abs() < 1e-9);
        assert_eq!(format_minutes(240.0), "4:00");
        assert_eq!(format_minutes(75.9), "1:15");
        assert_eq!(format_minutes(5.0), "0:05");
    }

    #[test]
    fn unannotated_network_is_rejected() {
        let mut network = RoadNetwork::new();
        network.add_node(1, 0.0, 0.0);
        network.add_node(2, 0.001, 0.0);
        network.add_edge(1, 2, 0, 100.0, None).unwrap();
        let result = solve_dual(&network, &Point::new(0.0, 0.0), &Point::new(0.001, 0.0));
        assert!(matches!(result, Err(Error::InvalidData(_))));
    }

    #[test]
    fn parallel_edges_report_the_chosen_instance() {
        let mut network = RoadNetwork::new();
        network.add_node(1, 0.0, 0.0);
        network.add_node(2, 0.001, 0.0);
        let direct = network.add_edge(1, 2, 0, 100.0, None).unwrap();
        let shaded = network.add_edge(1, 2, 1, 120.0, None).unwrap();
        network.set_cool_cost(direct, 100.0).unwrap();
        network.set_cool_cost(shaded, 42.0).unwrap();

        let routes = solve_dual(&network, &Point::new(0.0, 0.0), &Point::new(0.001, 0.0)).unwrap();
        assert_eq!(routes.fast.nodes, vec![1, 2]);
        assert_eq!(routes.cool.nodes, vec![1, 2]);
        assert_eq!(routes.fast.length_m, 100.0);
        assert_eq!(routes.cool.length_m, 120.0);
        assert_eq!(routes.cool.cool_cost, 42.0);
        assert!(routes.is_interchangeable());
    }

    #[test]
    fn empty_network_has_no_points() {
        let network = RoadNetwork::new();
        let result = solve_dual(&network, &Point::new(0.0, 0.0), &Point::new(0.001, 0.0));
        assert!(matches!(result, Err(Error::NoPointsFound)));
    }
}
