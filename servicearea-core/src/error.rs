use thiserror::Error;

use crate::NodeKey;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Street graph has no nodes")]
    EmptyGraph,
    #[error("Node {0} is not present in the street graph")]
    UnknownNode(NodeKey),
    #[error("Duplicate node key {0}")]
    DuplicateNode(NodeKey),
    #[error("Invalid length {length} for edge {source_node} -> {target_node}")]
    InvalidEdgeLength {
        source_node: NodeKey,
        target_node: NodeKey,
        length: f64,
    },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Column not found: {0}")]
    MissingColumn(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("GeoJSON error: {0}")]
    GeoJsonError(String),
}
