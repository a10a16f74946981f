use std::{cmp::Ordering, collections::BinaryHeap};

use hashbrown::HashMap;
use petgraph::{
    graph::{EdgeIndex, NodeIndex},
    visit::EdgeRef,
};

use crate::model::{RoadEdge, RoadGraph};

#[derive(Copy, Clone)]
struct State {
    cost: f64,
    node: NodeIndex,
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for State {}

// Min-heap by cost, ties broken by node index
impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Shortest path through the road graph, with the concrete edge chosen
/// between each pair of consecutive nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct TracedPath {
    pub nodes: Vec<NodeIndex>,
    pub edges: Vec<EdgeIndex>,
    pub cost: f64,
}

/// Dijkstra's algorithm from `start` to `target` under a non-negative edge
/// weight. Returns `None` when `target` is unreachable.
pub(crate) fn shortest_path<F>(
    graph: &RoadGraph,
    start: NodeIndex,
    target: NodeIndex,
    weight: F,
) -> Option<TracedPath>
where
    F: Fn(&RoadEdge) -> f64,
{
    let estimated_nodes = graph.node_count().min(1000);
    let mut distances: HashMap<NodeIndex, f64> = HashMap::with_capacity(estimated_nodes);
    let mut predecessors: HashMap<NodeIndex, EdgeIndex> = HashMap::with_capacity(estimated_nodes);
    let mut heap = BinaryHeap::with_capacity(estimated_nodes / 4);

    heap.push(State {
        cost: 0.0,
        node: start,
    });
    distances.insert(start, 0.0);

    while let Some(State { cost, node }) = heap.pop() {
        if node == target {
            break;
        }

        // Stale heap entry
        if let Some(&best) = distances.get(&node)
            && cost > best
        {
            continue;
        }

        for edge in graph.edges(node) {
            let next = edge.target();
            let next_cost = cost + weight(edge.weight());

            match distances.entry(next) {
                hashbrown::hash_map::Entry::Vacant(entry) => {
                    entry.insert(next_cost);
                    heap.push(State {
                        cost: next_cost,
                        node: next,
                    });
                    predecessors.insert(next, edge.id());
                }
                hashbrown::hash_map::Entry::Occupied(mut entry) => {
                    if next_cost < *entry.get() {
                        *entry.get_mut() = next_cost;
                        heap.push(State {
                            cost: next_cost,
                            node: next,
                        });
                        predecessors.insert(next, edge.id());
                    }
                }
            }
        }
    }

    let cost = *distances.get(&target)?;

    let mut nodes = vec![target];
    let mut edges = Vec::new();
    let mut current = target;
    while current != start {
        let edge = *predecessors.get(&current)?;
        let (source, _) = graph.edge_endpoints(edge)?;
        edges.push(edge);
        nodes.push(source);
        current = source;
    }
    nodes.reverse();
    edges.reverse();

    Some(TracedPath { nodes, edges, cost })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RoadNetwork;

    fn diamond() -> RoadNetwork {
        let mut network = RoadNetwork::new();
        for (id, lon) in [(1, 0.0), (2, 0.001), (3, 0.001), (4, 0.002)] {
            network.add_node(id, lon, 0.0);
        }
        network.add_edge(1, 2, 0, 10.0, None).unwrap();
        network.add_edge(2, 4, 0, 10.0, None).unwrap();
        network.add_edge(1, 3, 0, 5.0, None).unwrap();
        network.add_edge(3, 4, 0, 30.0, None).unwrap();
        // Cheaper parallel instance of 3 -> 4
        network.add_edge(3, 4, 1, 4.0, None).unwrap();
        network
    }

    #[test]
    fn picks_cheapest_parallel_edge() {
        let network = diamond();
        let start = network.node_index(1).unwrap();
        let target = network.node_index(4).unwrap();
        let path = shortest_path(&network.graph, start, target, |e| e.length).unwrap();

        assert_eq!(network.node_ids(&path.nodes), vec![1, 3, 4]);
        assert_eq!(path.edges.len(), 2);
        assert!((path.cost - 9.0).abs() < 1e-12);
        assert_eq!(network.edge(path.edges[1]).unwrap().key, 1);
    }

    #[test]
    fn follows_the_given_weight() {
        let network = diamond();
        let start = network.node_index(1).unwrap();
        let target = network.node_index(4).unwrap();
        // Penalize edges leaving node 1 towards node 3
        let path = shortest_path(&network.graph, start, target, |e| {
            if (e.length - 5.0).abs() < f64::EPSILON {
                100.0
            } else {
                e.length
            }
        })
        .unwrap();
        assert_eq!(network.node_ids(&path.nodes), vec![1, 2, 4]);
    }

    #[test]
    fn start_equals_target() {
        let network = diamond();
        let start = network.node_index(1).unwrap();
        let path = shortest_path(&network.graph, start, start, |e| e.length).unwrap();
        assert_eq!(path.nodes, vec![start]);
        assert!(path.edges.is_empty());
        assert_eq!(path.cost, 0.0);
    }

    #[test]
    fn unreachable_target_is_none() {
        let network = diamond();
        // Edges are directed: nothing leads back to node 1
        let start = network.node_index(4).unwrap();
        let target = network.node_index(1).unwrap();
        assert!(shortest_path(&network.graph, start, target, |e| e.length).is_none());
    }
}
