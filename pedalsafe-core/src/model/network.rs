//! Undirected bike lane graph

use geo::{Coord, Point};
use hashbrown::HashMap;
use hashbrown::hash_map::Entry;
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use rstar::RTree;
use rstar::primitives::GeomWithData;

use super::{LaneEdge, LaneNode, Segment};
use crate::{Error, RiskWeight};

/// R-tree entry pointing at a graph node
pub type IndexedPoint = GeomWithData<[f64; 2], NodeIndex>;

/// Exact coordinate identity of a node.
///
/// Two coordinates are the same node only if both components compare equal,
/// so no tolerance is applied. `-0.0` is folded into `0.0` to keep the key
/// consistent with `==`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CoordKey(u64, u64);

impl From<Coord<f64>> for CoordKey {
    fn from(coord: Coord<f64>) -> Self {
        CoordKey((coord.x + 0.0).to_bits(), (coord.y + 0.0).to_bits())
    }
}

/// Bike lane network, immutable once built
#[derive(Debug, Clone)]
pub struct BikeNetwork {
    graph: UnGraph<LaneNode, LaneEdge>,
    node_lookup: HashMap<CoordKey, NodeIndex>,
    rtree: RTree<IndexedPoint>,
}

impl BikeNetwork {
    pub fn graph(&self) -> &UnGraph<LaneNode, LaneEdge> {
        &self.graph
    }

    pub(crate) fn rtree(&self) -> &RTree<IndexedPoint> {
        &self.rtree
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// All nodes in graph iteration (insertion) order
    pub fn nodes(&self) -> impl Iterator<Item = (NodeIndex, Coord<f64>)> + '_ {
        self.graph
            .node_indices()
            .map(|idx| (idx, self.graph[idx].coord()))
    }

    /// All edges in insertion order, with their risk weights
    pub fn edges(&self) -> impl Iterator<Item = Segment> + '_ {
        self.graph.edge_references().map(|edge| {
            Segment::new(
                self.graph[edge.source()].coord(),
                self.graph[edge.target()].coord(),
                edge.weight().weight,
            )
        })
    }

    /// Neighbors of `node` with the weight of the connecting edge
    pub fn neighbors(&self, node: NodeIndex) -> impl Iterator<Item = (NodeIndex, RiskWeight)> + '_ {
        self.graph.edges(node).map(move |edge| {
            let other = if edge.source() == node {
                edge.target()
            } else {
                edge.source()
            };
            (other, edge.weight().weight)
        })
    }

    /// Node located exactly at `coord`
    pub fn node_index(&self, coord: Coord<f64>) -> Option<NodeIndex> {
        self.node_lookup.get(&CoordKey::from(coord)).copied()
    }

    pub fn coord(&self, node: NodeIndex) -> Option<Coord<f64>> {
        self.graph.node_weight(node).map(LaneNode::coord)
    }

    pub fn edge_weight(&self, a: NodeIndex, b: NodeIndex) -> Option<RiskWeight> {
        self.graph
            .find_edge(a, b)
            .and_then(|edge| self.graph.edge_weight(edge))
            .map(LaneEdge::risk_weight)
    }
}

/// Incremental builder folding segments into a [`BikeNetwork`]
#[derive(Debug, Default)]
pub struct NetworkBuilder {
    graph: UnGraph<LaneNode, LaneEdge>,
    node_lookup: HashMap<CoordKey, NodeIndex>,
}

impl NetworkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an edge between the segment endpoints.
    ///
    /// An existing edge between the same two nodes keeps its identity but
    /// takes the new weight (last write wins).
    pub fn add_segment(&mut self, segment: Segment) {
        let a = self.node_for(segment.start);
        let b = self.node_for(segment.end);
        self.graph.update_edge(
            a,
            b,
            LaneEdge {
                weight: segment.weight,
            },
        );
    }

    fn node_for(&mut self, coord: Coord<f64>) -> NodeIndex {
        match self.node_lookup.entry(CoordKey::from(coord)) {
            Entry::Occupied(entry) => *entry.get(),
            Entry::Vacant(entry) => {
                let idx = self.graph.add_node(LaneNode {
                    geometry: Point(coord),
                });
                *entry.insert(idx)
            }
        }
    }

    /// Finalizes the network and builds its spatial index
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyDataset`] if no segment was added
    pub fn build(self) -> Result<BikeNetwork, Error> {
        if self.graph.node_count() == 0 {
            return Err(Error::EmptyDataset);
        }

        let points = self
            .graph
            .node_indices()
            .map(|idx| {
                let coord = self.graph[idx].coord();
                GeomWithData::new([coord.x, coord.y], idx)
            })
            .collect();

        Ok(BikeNetwork {
            graph: self.graph,
            node_lookup: self.node_lookup,
            rtree: RTree::bulk_load(points),
        })
    }
}

impl Extend<Segment> for NetworkBuilder {
    fn extend<I: IntoIterator<Item = Segment>>(&mut self, iter: I) {
        for segment in iter {
            self.add_segment(segment);
        }
    }
}
