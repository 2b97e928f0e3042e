use crate::{StreetGraph, StreetGraphBuilder};

/// Unit square walked in both directions, every edge of length 1:
/// 1 (0,0), 2 (0,1), 3 (1,1), 4 (1,0)
pub(crate) fn square_graph() -> StreetGraph {
    let mut builder = StreetGraphBuilder::new();
    builder.add_node(1, 0.0, 0.0).unwrap();
    builder.add_node(2, 0.0, 1.0).unwrap();
    builder.add_node(3, 1.0, 1.0).unwrap();
    builder.add_node(4, 1.0, 0.0).unwrap();
    for (a, b) in [(1, 2), (2, 3), (3, 4), (4, 1)] {
        builder.add_edge(a, b, 1.0).unwrap();
        builder.add_edge(b, a, 1.0).unwrap();
    }
    builder.build()
}

/// Square plus a dangling two-node street far away:
/// 10 (5,5) -> 11 (5,6) with length 1, and 12 (9,9) reachable only over a 50 long edge
pub(crate) fn square_with_spur() -> StreetGraph {
    let mut builder = StreetGraphBuilder::new();
    builder.add_node(1, 0.0, 0.0).unwrap();
    builder.add_node(2, 0.0, 1.0).unwrap();
    builder.add_node(3, 1.0, 1.0).unwrap();
    builder.add_node(4, 1.0, 0.0).unwrap();
    for (a, b) in [(1, 2), (2, 3), (3, 4), (4, 1)] {
        builder.add_edge(a, b, 1.0).unwrap();
        builder.add_edge(b, a, 1.0).unwrap();
    }
    builder.add_node(10, 5.0, 5.0).unwrap();
    builder.add_node(11, 5.0, 6.0).unwrap();
    builder.add_node(12, 9.0, 9.0).unwrap();
    builder.add_edge(10, 11, 1.0).unwrap();
    builder.add_edge(11, 12, 50.0).unwrap();
    builder.build()
}

/// Straight street 20 (0,0) -> 21 (1,0) -> 22 (2,0), lengths 1
pub(crate) fn line_graph() -> StreetGraph {
    let mut builder = StreetGraphBuilder::new();
    builder.add_node(20, 0.0, 0.0).unwrap();
    builder.add_node(21, 1.0, 0.0).unwrap();
    builder.add_node(22, 2.0, 0.0).unwrap();
    builder.add_edge(20, 21, 1.0).unwrap();
    builder.add_edge(21, 22, 1.0).unwrap();
    builder.build()
}
