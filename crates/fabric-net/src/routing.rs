//! Shortest-path search over wired nodes.
//!
//! Both algorithms walk each node's neighbors in the order fixed by `Graph`'s adjacency map —
//! sorted by `(neighbor name, key)` — so relaxing on strict improvement (never on ties) yields a
//! path chosen deterministically by lowest destination name, then lowest key, at every fork.

use std::collections::{BTreeMap, VecDeque};

use crate::graph::{Graph, NodeId};
use crate::link::{Link, LinkId};

/// Edge weight a path search optimizes for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Weight {
    Hops,
    Distance,
    Latency,
}

/// Unweighted breadth-first search; every edge costs 1 hop.
pub(crate) fn bfs(graph: &Graph, src: NodeId, dst: NodeId) -> Option<Vec<LinkId>> {
    let mut came_from: BTreeMap<NodeId, (NodeId, LinkId)> = BTreeMap::new();
    let mut visited = std::collections::HashSet::new();
    visited.insert(src);
    let mut queue = VecDeque::from([src]);

    while let Some(node) = queue.pop_front() {
        if node == dst {
            return Some(reconstruct(src, dst, &came_from));
        }
        for (neighbor, link_id) in graph.adjacency(node) {
            if visited.insert(neighbor) {
                came_from.insert(neighbor, (node, link_id));
                queue.push_back(neighbor);
            }
        }
    }
    None
}

/// Dijkstra's algorithm with a caller-supplied non-negative edge cost.
pub(crate) fn dijkstra(graph: &Graph, src: NodeId, dst: NodeId, cost: impl Fn(&Link) -> f64) -> Option<Vec<LinkId>> {
    let mut dist: BTreeMap<NodeId, f64> = BTreeMap::new();
    let mut came_from: BTreeMap<NodeId, (NodeId, LinkId)> = BTreeMap::new();
    let mut visited = std::collections::HashSet::new();
    dist.insert(src, 0.0);

    loop {
        let Some((&node, &d)) = dist
            .iter()
            .filter(|(n, _)| !visited.contains(*n))
            .min_by(|(_, a), (_, b)| a.total_cmp(b))
        else {
            break;
        };
        if node == dst {
            return Some(reconstruct(src, dst, &came_from));
        }
        visited.insert(node);

        for (neighbor, link_id) in graph.adjacency(node) {
            if visited.contains(&neighbor) {
                continue;
            }
            let link = graph.link(link_id).expect("adjacency points at a live link");
            let candidate = d + cost(link);
            let better = match dist.get(&neighbor) {
                Some(&existing) => candidate < existing,
                None => true,
            };
            if better {
                dist.insert(neighbor, candidate);
                came_from.insert(neighbor, (node, link_id));
            }
        }
    }
    None
}

fn reconstruct(src: NodeId, dst: NodeId, came_from: &BTreeMap<NodeId, (NodeId, LinkId)>) -> Vec<LinkId> {
    let mut path = Vec::new();
    let mut cur = dst;
    while cur != src {
        let &(prev, link_id) = &came_from[&cur];
        path.push(link_id);
        cur = prev;
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bfs_finds_direct_edge_over_longer_indirect_one() {
        let mut g = Graph::new();
        let a = g.add_wired_node("a");
        let b = g.add_wired_node("b");
        let c = g.add_wired_node("c");
        g.add_link(a, b, None, 10.0, 1.0, None).unwrap();
        g.add_link(b, c, None, 10.0, 1.0, None).unwrap();
        g.add_link(a, c, None, 10.0, 1.0, None).unwrap();

        let path = bfs(&g, a, c).unwrap();
        assert_eq!(path.len(), 1);
    }

    #[test]
    fn dijkstra_returns_none_when_unreachable() {
        let mut g = Graph::new();
        let a = g.add_wired_node("a");
        let b = g.add_wired_node("b");
        assert!(dijkstra(&g, a, b, |l| l.base_latency()).is_none());
    }
}
