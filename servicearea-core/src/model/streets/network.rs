//! Street graph with spatial indexes over its nodes

use std::fmt;
use std::sync::OnceLock;

use geo::{ConvexHull, MultiPoint, Point, Polygon};
use hashbrown::HashMap;
use log::info;
use petgraph::graph::{DiGraph, EdgeReference, NodeIndex};
use rstar::RTree;
use rstar::primitives::GeomWithData;

use super::{StreetEdge, StreetNode};
use crate::{Distance, Error, NodeKey};

/// R-tree entry: node coordinates tagged with the graph index
pub type IndexedPoint = GeomWithData<[f64; 2], NodeIndex>;

/// R-tree entry: lon/lat node position as a unit vector on the sphere
pub type SpherePoint = GeomWithData<[f64; 3], NodeIndex>;

/// Unit vector of a lon/lat point. Chord length between two such vectors
/// grows monotonically with great-circle distance.
fn unit_vector(point: &Point<f64>) -> [f64; 3] {
    let (lon, lat) = (point.x().to_radians(), point.y().to_radians());
    [lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin()]
}

/// Directed street multigraph. Parallel edges between the same pair of
/// nodes are kept as separate edges.
///
/// The graph is immutable once built, construct it with [`StreetGraphBuilder`].
pub struct StreetGraph {
    pub(crate) graph: DiGraph<StreetNode, StreetEdge>,
    rtree: RTree<IndexedPoint>,
    sphere_rtree: OnceLock<RTree<SpherePoint>>,
    key_index: HashMap<NodeKey, NodeIndex>,
    coverage: Option<Polygon<f64>>,
}

impl StreetGraph {
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Graph index of the node with the given key
    pub fn node_index(&self, key: NodeKey) -> Option<NodeIndex> {
        self.key_index.get(&key).copied()
    }

    pub fn node(&self, index: NodeIndex) -> Option<&StreetNode> {
        self.graph.node_weight(index)
    }

    pub fn node_key(&self, index: NodeIndex) -> Option<NodeKey> {
        self.graph.node_weight(index).map(|node| node.key)
    }

    pub fn contains_key(&self, key: NodeKey) -> bool {
        self.key_index.contains_key(&key)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &StreetNode> {
        self.graph.node_weights()
    }

    /// Outgoing edges of a node
    pub fn edges(&self, index: NodeIndex) -> impl Iterator<Item = EdgeReference<'_, StreetEdge>> {
        self.graph.edges(index)
    }

    /// Nearest node to a point by Euclidean distance in the graph's
    /// coordinate space. Use for projected graphs.
    pub fn nearest_node(&self, point: &Point<f64>) -> Option<NodeIndex> {
        self.rtree
            .nearest_neighbor(&[point.x(), point.y()])
            .map(|indexed| indexed.data)
    }

    /// Nearest node to a lon/lat point by great-circle distance.
    /// Node coordinates are read as (longitude, latitude) in degrees.
    ///
    /// The spherical index is built on first use.
    pub fn nearest_node_geographic(&self, point: &Point<f64>) -> Option<NodeIndex> {
        self.sphere_rtree
            .get_or_init(|| {
                let entries = self
                    .graph
                    .node_indices()
                    .map(|index| SpherePoint::new(unit_vector(&self.graph[index].geometry), index))
                    .collect();
                RTree::bulk_load(entries)
            })
            .nearest_neighbor(&unit_vector(point))
            .map(|indexed| indexed.data)
    }

    /// Convex hull of all node coordinates, `None` for an empty graph
    pub fn coverage(&self) -> Option<&Polygon<f64>> {
        self.coverage.as_ref()
    }
}

impl fmt::Debug for StreetGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreetGraph")
            .field("nodes", &self.graph.node_count())
            .field("edges", &self.graph.edge_count())
            .finish()
    }
}

/// Incremental construction of a [`StreetGraph`]
#[derive(Debug, Default)]
pub struct StreetGraphBuilder {
    graph: DiGraph<StreetNode, StreetEdge>,
    key_index: HashMap<NodeKey, NodeIndex>,
}

impl StreetGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            graph: DiGraph::with_capacity(nodes, edges),
            key_index: HashMap::with_capacity(nodes),
        }
    }

    /// Adds a node at `(x, y)`.
    ///
    /// # Errors
    ///
    /// Fails on a repeated key or non-finite coordinates.
    pub fn add_node(&mut self, key: NodeKey, x: f64, y: f64) -> Result<NodeIndex, Error> {
        if !(x.is_finite() && y.is_finite()) {
            return Err(Error::InvalidData(format!(
                "Node {key} has non-finite coordinates ({x}, {y})"
            )));
        }
        if self.key_index.contains_key(&key) {
            return Err(Error::DuplicateNode(key));
        }

        let index = self.graph.add_node(StreetNode {
            key,
            geometry: Point::new(x, y),
        });
        self.key_index.insert(key, index);
        Ok(index)
    }

    /// Adds a directed edge between two existing nodes.
    ///
    /// # Errors
    ///
    /// Fails if either endpoint is unknown or the length is negative or not finite.
    pub fn add_edge(
        &mut self,
        source: NodeKey,
        target: NodeKey,
        length: Distance,
    ) -> Result<(), Error> {
        if !length.is_finite() || length < 0.0 {
            return Err(Error::InvalidEdgeLength {
                source_node: source,
                target_node: target,
                length,
            });
        }
        let source_index = *self
            .key_index
            .get(&source)
            .ok_or(Error::UnknownNode(source))?;
        let target_index = *self
            .key_index
            .get(&target)
            .ok_or(Error::UnknownNode(target))?;

        self.graph
            .add_edge(source_index, target_index, StreetEdge { length });
        Ok(())
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Freezes the graph, bulk loads the spatial index and computes the
    /// coverage hull
    pub fn build(self) -> StreetGraph {
        let entries: Vec<IndexedPoint> = self
            .graph
            .node_indices()
            .map(|index| {
                let geometry = self.graph[index].geometry;
                IndexedPoint::new([geometry.x(), geometry.y()], index)
            })
            .collect();
        let rtree = RTree::bulk_load(entries);

        let coverage = (self.graph.node_count() > 0).then(|| {
            let graph_nodes: MultiPoint = self
                .graph
                .node_weights()
                .map(|node| node.geometry)
                .collect();
            graph_nodes.convex_hull()
        });

        info!(
            "Street graph built with {} nodes and {} edges",
            self.graph.node_count(),
            self.graph.edge_count()
        );

        StreetGraph {
            graph: self.graph,
            rtree,
            sphere_rtree: OnceLock::new(),
            key_index: self.key_index,
            coverage,
        }
    }
}

#[cfg(test)]
mod tests {
    use geo::{Area, Intersects};

    use super::*;
    use crate::test_utils::square_graph;

    #[test]
    fn test_nearest_node() {
        let graph = square_graph();
        let nearest = graph.nearest_node(&Point::new(0.9, 0.2)).unwrap();
        assert_eq!(graph.node_key(nearest), Some(4));

        let nearest = graph.nearest_node(&Point::new(-5.0, -5.0)).unwrap();
        assert_eq!(graph.node_key(nearest), Some(1));
    }

    #[test]
    fn test_empty_graph_has_no_nearest_node() {
        let graph = StreetGraphBuilder::new().build();
        assert!(graph.is_empty());
        assert!(graph.nearest_node(&Point::new(0.0, 0.0)).is_none());
        assert!(graph.nearest_node_geographic(&Point::new(0.0, 0.0)).is_none());
        assert!(graph.coverage().is_none());
    }

    #[test]
    fn test_builder_rejects_bad_input() {
        let mut builder = StreetGraphBuilder::new();
        builder.add_node(1, 0.0, 0.0).unwrap();
        builder.add_node(2, 1.0, 0.0).unwrap();

        assert!(matches!(
            builder.add_node(1, 5.0, 5.0),
            Err(Error::DuplicateNode(1))
        ));
        assert!(matches!(
            builder.add_node(3, f64::NAN, 0.0),
            Err(Error::InvalidData(_))
        ));
        assert!(matches!(
            builder.add_edge(1, 9, 1.0),
            Err(Error::UnknownNode(9))
        ));
        assert!(matches!(
            builder.add_edge(1, 2, -1.0),
            Err(Error::InvalidEdgeLength { .. })
        ));
        assert!(matches!(
            builder.add_edge(1, 2, f64::INFINITY),
            Err(Error::InvalidEdgeLength { .. })
        ));
    }

    #[test]
    fn test_parallel_edges_are_kept() {
        let mut builder = StreetGraphBuilder::new();
        builder.add_node(1, 0.0, 0.0).unwrap();
        builder.add_node(2, 1.0, 0.0).unwrap();
        builder.add_edge(1, 2, 5.0).unwrap();
        builder.add_edge(1, 2, 2.0).unwrap();
        let graph = builder.build();

        assert_eq!(graph.edge_count(), 2);
        let index = graph.node_index(1).unwrap();
        assert_eq!(graph.edges(index).count(), 2);
    }

    #[test]
    fn test_coverage_is_node_hull() {
        let graph = square_graph();
        let coverage = graph.coverage().unwrap();
        assert!((coverage.unsigned_area() - 1.0).abs() < 1e-12);
        assert!(coverage.intersects(&Point::new(0.5, 0.5)));
        assert!(!coverage.intersects(&Point::new(2.0, 0.5)));
    }

    #[test]
    fn test_nearest_node_geographic_uses_great_circle_distance() {
        // At 60N a degree of longitude is half a degree of latitude
        let mut builder = StreetGraphBuilder::new();
        builder.add_node(1, 10.01, 60.0).unwrap();
        builder.add_node(2, 10.0, 60.006).unwrap();
        let graph = builder.build();
        let query = Point::new(10.0, 60.0);

        let planar = graph.nearest_node(&query).unwrap();
        assert_eq!(graph.node_key(planar), Some(2));

        let geographic = graph.nearest_node_geographic(&query).unwrap();
        assert_eq!(graph.node_key(geographic), Some(1));
    }

    #[test]
    fn test_nearest_node_geographic_across_antimeridian() {
        let mut builder = StreetGraphBuilder::new();
        builder.add_node(1, 179.99, 0.0).unwrap();
        builder.add_node(2, 179.0, 0.0).unwrap();
        let graph = builder.build();

        let nearest = graph.nearest_node_geographic(&Point::new(-179.99, 0.0)).unwrap();
        assert_eq!(graph.node_key(nearest), Some(1));
    }
}
