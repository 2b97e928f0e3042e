//! Service area algorithms on top of the street graph

pub mod buffer;
pub mod ego;
pub mod service_area;

pub use buffer::buffer_points;
pub use ego::{EgoSubgraph, ReachedNode};
pub use service_area::{
    ServiceAreaCollection, ServiceAreaComputer, ServiceAreaConfig, ServiceAreaFailure,
};
