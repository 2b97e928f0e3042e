use std::cmp::Ordering;

use petgraph::graph::NodeIndex;

use crate::Distance;

#[derive(Copy, Clone, Debug, PartialEq)]
pub(super) struct State {
    pub(super) cost: Distance,
    pub(super) node: NodeIndex,
}

// Edge lengths are validated finite on graph construction
impl Eq for State {}

// Implement Ord for State to use in BinaryHeap
impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap by cost (reversed from standard Rust BinaryHeap)
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| self.node.cmp(&other.node))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BinaryHeap;

    use super::*;

    #[test]
    fn test_heap_pops_smallest_cost_first() {
        let mut heap = BinaryHeap::new();
        for (cost, node) in [(3.5, 0), (0.25, 1), (2.0, 2)] {
            heap.push(State {
                cost,
                node: NodeIndex::new(node),
            });
        }

        let order: Vec<f64> = std::iter::from_fn(|| heap.pop().map(|s| s.cost)).collect();
        assert_eq!(order, vec![0.25, 2.0, 3.5]);
    }
}
