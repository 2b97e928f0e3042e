use std::collections::BinaryHeap;

use fixedbitset::FixedBitSet;
use hashbrown::HashMap;
use petgraph::{graph::NodeIndex, visit::EdgeRef};

use super::state::State;
use crate::{Distance, model::StreetGraph};

/// Dijkstra's algorithm bounded by network distance.
///
/// Follows outgoing edges only and returns every node whose shortest
/// cumulative length from `start` is `<= max_distance`, mapped to that length.
/// The start node is always present with distance 0. An index outside the
/// graph yields an empty map.
pub fn bounded_dijkstra(
    graph: &StreetGraph,
    start: NodeIndex,
    max_distance: Distance,
) -> HashMap<NodeIndex, Distance> {
    let node_count = graph.node_count();
    let mut distances: HashMap<NodeIndex, Distance> = HashMap::new();
    if start.index() >= node_count {
        return distances;
    }

    let mut settled = FixedBitSet::with_capacity(node_count);
    let mut heap = BinaryHeap::new();

    // Start node has distance 0
    heap.push(State {
        cost: 0.0,
        node: start,
    });
    distances.insert(start, 0.0);

    while let Some(State { cost, node }) = heap.pop() {
        // Stale heap entry, a shorter path was already settled
        if settled.put(node.index()) {
            continue;
        }

        for edge in graph.edges(node) {
            let next = edge.target();
            let next_cost = cost + edge.weight().length;

            if next_cost > max_distance {
                continue;
            }

            match distances.entry(next) {
                hashbrown::hash_map::Entry::Vacant(entry) => {
                    entry.insert(next_cost);
                    heap.push(State {
                        cost: next_cost,
                        node: next,
                    });
                }
                hashbrown::hash_map::Entry::Occupied(mut entry) => {
                    if next_cost < *entry.get() {
                        *entry.get_mut() = next_cost;
                        heap.push(State {
                            cost: next_cost,
                            node: next,
                        });
                    }
                }
            }
        }
    }

    distances
}
