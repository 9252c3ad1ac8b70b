use std::collections::VecDeque;

use fixedbitset::FixedBitSet;
use hashbrown::HashMap;
use petgraph::graph::NodeIndex;

use crate::BikeNetwork;

/// Outcome of a path search between two nodes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSearch {
    /// Nodes from source to target, both included
    Found(Vec<NodeIndex>),
    NotFound,
}

/// Breadth-first search for the path with the fewest edges.
///
/// Edge weights are ignored: a direct high-risk segment is preferred over a
/// two-segment low-risk detour.
pub fn shortest_hop_path(
    network: &BikeNetwork,
    source: NodeIndex,
    target: NodeIndex,
) -> PathSearch {
    if source == target {
        return PathSearch::Found(vec![source]);
    }

    let graph = network.graph();
    let mut visited = FixedBitSet::with_capacity(graph.node_count());
    let mut predecessors: HashMap<NodeIndex, NodeIndex> = HashMap::new();
    let mut queue = VecDeque::new();

    visited.insert(source.index());
    queue.push_back(source);

    while let Some(node) = queue.pop_front() {
        for next in graph.neighbors(node) {
            // `put` returns whether the bit was already set
            if visited.put(next.index()) {
                continue;
            }
            predecessors.insert(next, node);

            if next == target {
                let path = reconstruct_path(&predecessors, source, target);
                log::trace!("Found {}-hop path", path.len() - 1);
                return PathSearch::Found(path);
            }
            queue.push_back(next);
        }
    }

    log::trace!(
        "No path between {source:?} and {target:?} ({} nodes explored)",
        visited.count_ones(..)
    );
    PathSearch::NotFound
}

fn reconstruct_path(
    predecessors: &HashMap<NodeIndex, NodeIndex>,
    source: NodeIndex,
    target: NodeIndex,
) -> Vec<NodeIndex> {
    let mut path = vec![target];
    let mut current = target;
    while current != source {
        match predecessors.get(&current) {
            Some(&prev) => {
                path.push(prev);
                current = prev;
            }
            None => break,
        }
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use geo::{Coord, coord};

    use super::*;
    use crate::loading::{DatasetRow, build_graph};
    use crate::{LaneGeometry, RiskWeight};

    fn network(lines: Vec<(Vec<(f64, f64)>, RiskWeight)>) -> BikeNetwork {
        build_graph(lines.into_iter().map(|(coords, risk_weight)| DatasetRow {
            geometry: LaneGeometry::Line(coords.into()),
            risk_weight,
        }))
        .unwrap()
    }

    fn node(network: &BikeNetwork, coord: Coord<f64>) -> NodeIndex {
        network.node_index(coord).unwrap()
    }

    #[test]
    fn prefers_fewer_hops_over_lower_risk() {
        let network = network(vec![
            (vec![(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)], 0),
            (vec![(0.0, 0.0), (2.0, 0.0)], 50),
        ]);
        let source = node(&network, coord! { x: 0.0, y: 0.0 });
        let target = node(&network, coord! { x: 2.0, y: 0.0 });

        assert_eq!(
            shortest_hop_path(&network, source, target),
            PathSearch::Found(vec![source, target])
        );
    }

    #[test]
    fn path_runs_from_source_to_target() {
        let network = network(vec![(
            vec![(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (3.0, 0.0)],
            1,
        )]);
        let source = node(&network, coord! { x: 3.0, y: 0.0 });
        let target = node(&network, coord! { x: 0.0, y: 0.0 });

        let PathSearch::Found(path) = shortest_hop_path(&network, source, target) else {
            panic!("expected a path");
        };
        let coords: Vec<_> = path.iter().map(|&n| network.coord(n).unwrap().x).collect();
        assert_eq!(coords, vec![3.0, 2.0, 1.0, 0.0]);
    }

    #[test]
    fn disconnected_components_have_no_path() {
        let network = network(vec![
            (vec![(0.0, 0.0), (1.0, 0.0)], 0),
            (vec![(5.0, 5.0), (6.0, 5.0)], 0),
        ]);
        let source = node(&network, coord! { x: 0.0, y: 0.0 });
        let target = node(&network, coord! { x: 6.0, y: 5.0 });

        assert_eq!(shortest_hop_path(&network, source, target), PathSearch::NotFound);
    }

    #[test]
    fn same_node_is_a_single_node_path() {
        let network = network(vec![(vec![(0.0, 0.0), (1.0, 0.0)], 0)]);
        let source = node(&network, coord! { x: 1.0, y: 0.0 });

        assert_eq!(
            shortest_hop_path(&network, source, source),
            PathSearch::Found(vec![source])
        );
    }
}
