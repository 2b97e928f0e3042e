//! This module is responsible for loading street graphs and query records
//! from files.

mod node_link;
mod records;

pub use node_link::{load_node_link_graph, parse_node_link_graph};
pub use records::{QueryPoint, RecordTable};
