//! Street graphs in node-link JSON, as written by networkx `node_link_data`
//! for osmnx graphs.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use log::info;
use serde::Deserialize;

use crate::{Distance, Error, NodeKey, StreetGraph, StreetGraphBuilder};

#[derive(Debug, Deserialize)]
struct NodeLinkDocument {
    #[serde(default = "default_directed")]
    directed: bool,
    nodes: Vec<NodeLinkNode>,
    #[serde(default, alias = "edges")]
    links: Vec<NodeLinkEdge>,
}

#[derive(Debug, Deserialize)]
struct NodeLinkNode {
    id: NodeKey,
    x: f64,
    y: f64,
}

#[derive(Debug, Deserialize)]
struct NodeLinkEdge {
    source: NodeKey,
    target: NodeKey,
    length: Distance,
}

fn default_directed() -> bool {
    true
}

/// Reads a node-link JSON file into a street graph.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not valid node-link JSON
/// or contains invalid nodes or edges.
pub fn load_node_link_graph(path: &Path) -> Result<StreetGraph, Error> {
    info!("Loading street graph: {}", path.display());

    let file = File::open(path).map_err(|e| {
        std::io::Error::new(
            e.kind(),
            format!("Failed to open file '{}': {}", path.display(), e),
        )
    })?;
    let document: NodeLinkDocument = serde_json::from_reader(BufReader::new(file))?;
    graph_from_document(document)
}

/// Parses node-link JSON from a string
pub fn parse_node_link_graph(json: &str) -> Result<StreetGraph, Error> {
    let document: NodeLinkDocument = serde_json::from_str(json)?;
    graph_from_document(document)
}

fn graph_from_document(document: NodeLinkDocument) -> Result<StreetGraph, Error> {
    let edge_capacity = if document.directed {
        document.links.len()
    } else {
        document.links.len() * 2
    };
    let mut builder = StreetGraphBuilder::with_capacity(document.nodes.len(), edge_capacity);

    for node in &document.nodes {
        builder.add_node(node.id, node.x, node.y)?;
    }

    for edge in &document.links {
        builder.add_edge(edge.source, edge.target, edge.length)?;
        // Undirected graphs are walkable both ways
        if !document.directed && edge.source != edge.target {
            builder.add_edge(edge.target, edge.source, edge.length)?;
        }
    }

    Ok(builder.build())
}
