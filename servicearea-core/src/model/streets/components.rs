//! Street network components - nodes and edges

use geo::Point;

use crate::{Distance, NodeKey};

/// Street graph node
#[derive(Debug, Clone)]
pub struct StreetNode {
    /// External (OSM) ID of the node
    pub key: NodeKey,
    /// Node coordinates
    pub geometry: Point<f64>,
}

/// Street graph edge (street segment)
#[derive(Debug, Clone, Copy)]
pub struct StreetEdge {
    /// Segment length, non-negative and finite
    pub length: Distance,
}
