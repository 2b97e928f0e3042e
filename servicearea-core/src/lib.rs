//! Service area computation over street networks.
//!
//! Query locations are snapped to the nearest street node, a radius-bounded
//! network expansion is run from every snapped node and the reached nodes are
//! reduced to convex hull polygons.

pub mod algo;
pub mod error;
pub mod loading;
pub mod model;
pub mod prelude;
pub mod routing;

#[cfg(test)]
pub(crate) mod test_utils;

pub use algo::service_area::{
    ServiceAreaCollection, ServiceAreaComputer, ServiceAreaConfig, ServiceAreaFailure,
};
pub use error::Error;
pub use loading::{QueryPoint, RecordTable, load_node_link_graph};
pub use model::{StreetGraph, StreetGraphBuilder};

/// External (OSM style) identifier of a street node
pub type NodeKey = i64;
/// Network distance in the unit of edge `length`, usually metres
pub type Distance = f64;

/// Default service area radius
pub const DEFAULT_RADIUS: Distance = 400.0;
/// Default coordinate reference system tag
pub const DEFAULT_CRS: &str = "EPSG:4326";
