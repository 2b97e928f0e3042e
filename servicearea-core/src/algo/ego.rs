//! Radius-bounded neighbourhood of a single street node

use geo::{Area, ConvexHull, MultiPoint, Point, Polygon};
use itertools::Itertools;

use super::service_area::ServiceAreaFailure;
use crate::{Distance, NodeKey, model::StreetGraph, routing::bounded_dijkstra};

/// Node reached during expansion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReachedNode {
    pub key: NodeKey,
    pub geometry: Point<f64>,
    /// Shortest network distance from the source
    pub distance: Distance,
}

/// All nodes within `radius` network distance of a source node,
/// ordered by distance (ties by key).
#[derive(Debug, Clone, PartialEq)]
pub struct EgoSubgraph {
    source: NodeKey,
    radius: Distance,
    nodes: Vec<ReachedNode>,
}

impl EgoSubgraph {
    /// Expands from `source` over outgoing edges.
    ///
    /// # Errors
    ///
    /// [`ServiceAreaFailure::Expansion`] if the key is not in the graph.
    pub fn expand(
        graph: &StreetGraph,
        source: NodeKey,
        radius: Distance,
    ) -> Result<Self, ServiceAreaFailure> {
        let start = graph
            .node_index(source)
            .ok_or(ServiceAreaFailure::Expansion { node: source })?;

        let nodes = bounded_dijkstra(graph, start, radius)
            .into_iter()
            .filter_map(|(index, distance)| {
                graph.node(index).map(|node| ReachedNode {
                    key: node.key,
                    geometry: node.geometry,
                    distance,
                })
            })
            .sorted_by(|a, b| {
                a.distance
                    .total_cmp(&b.distance)
                    .then_with(|| a.key.cmp(&b.key))
            })
            .collect();

        Ok(Self {
            source,
            radius,
            nodes,
        })
    }

    pub fn source(&self) -> NodeKey {
        self.source
    }

    pub fn radius(&self) -> Distance {
        self.radius
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[ReachedNode] {
        &self.nodes
    }

    pub fn node_keys(&self) -> impl Iterator<Item = NodeKey> + '_ {
        self.nodes.iter().map(|node| node.key)
    }

    pub fn distance_to(&self, key: NodeKey) -> Option<Distance> {
        self.nodes
            .iter()
            .find(|node| node.key == key)
            .map(|node| node.distance)
    }

    pub fn points(&self) -> MultiPoint<f64> {
        self.nodes.iter().map(|node| node.geometry).collect()
    }

    /// Convex hull over the coordinates of all member nodes.
    ///
    /// # Errors
    ///
    /// [`ServiceAreaFailure::Hull`] with fewer than 3 nodes, or when all
    /// nodes lie on one line and the hull has no area.
    pub fn convex_hull(&self) -> Result<Polygon<f64>, ServiceAreaFailure> {
        let failure = ServiceAreaFailure::Hull {
            node: self.source,
            points: self.nodes.len(),
        };
        if self.nodes.len() < 3 {
            return Err(failure);
        }

        let hull = self.points().convex_hull();
        if hull.unsigned_area() > 0.0 {
            Ok(hull)
        } else {
            Err(failure)
        }
    }
}
