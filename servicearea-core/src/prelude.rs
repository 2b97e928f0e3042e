pub use crate::{DEFAULT_CRS, DEFAULT_RADIUS};

// Re-export key components
pub use crate::algo::buffer::{DEFAULT_BUFFER_DISTANCE, buffer_points};
pub use crate::algo::ego::{EgoSubgraph, ReachedNode};
pub use crate::algo::service_area::{
    ServiceAreaCollection, ServiceAreaComputer, ServiceAreaConfig, ServiceAreaFailure,
};
pub use crate::loading::{QueryPoint, RecordTable, load_node_link_graph, parse_node_link_graph};
pub use crate::model::{StreetEdge, StreetGraph, StreetGraphBuilder, StreetNode};

// Core types for the street network
pub use crate::Distance;
pub use crate::Error;
pub use crate::NodeKey;
