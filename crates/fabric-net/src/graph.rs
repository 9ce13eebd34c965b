//! The network topology: a directed multigraph of nodes and links.

use rustc_hash::FxHashMap;

use crate::errors::GraphError;
use crate::link::{Link, LinkId};
use crate::routing::{self, Weight};

/// Unique node id, assigned in registration order.
pub type NodeId = u32;

/// Default edge key used when a caller doesn't care about disambiguating parallel edges.
pub const DEFAULT_KEY: u32 = 0;

/// A single hop of a resolved path: either a real, bandwidth-bearing [`Link`], or a synthetic
/// zero-cost wireless hop between a wireless node and its wired anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hop {
    Wired(LinkId),
    Wireless { from: NodeId, to: NodeId },
}

#[derive(Debug, Clone)]
enum NodeKind {
    Wired,
    /// `anchor` is the id of the wired node this endpoint is reachable through. `None` means the
    /// node was declared wireless with no anchor configured — every query against it fails with
    /// [`GraphError::IsolatedWireless`].
    Wireless { anchor: Option<NodeId> },
}

struct NodeEntry {
    name: String,
    kind: NodeKind,
}

/// Directed multigraph keyed by node name, with edges disambiguated by `(src, dst, key)`.
///
/// Real [`Link`]s only ever connect two wired nodes; wireless nodes are attached to the graph
/// through an anchor and traversed via a synthetic, zero-cost [`Hop::Wireless`] prefix/suffix
/// instead of a real edge.
#[derive(Default)]
pub struct Graph {
    nodes: Vec<NodeEntry>,
    name_to_id: FxHashMap<String, NodeId>,
    links: Vec<Option<Link>>,
    // Per-source adjacency, ordered by (neighbor name, key) so traversal order is deterministic.
    adjacency: Vec<std::collections::BTreeMap<(String, u32), (NodeId, LinkId)>>,
}

impl Graph {
    pub fn new() -> Self {
        Default::default()
    }

    fn push_node(&mut self, name: &str, kind: NodeKind) -> NodeId {
        assert!(!self.name_to_id.contains_key(name), "duplicate node name `{name}`");
        let id = self.nodes.len() as NodeId;
        self.nodes.push(NodeEntry { name: name.to_owned(), kind });
        self.name_to_id.insert(name.to_owned(), id);
        self.adjacency.push(std::collections::BTreeMap::new());
        id
    }

    /// Registers a wired node and returns its id.
    pub fn add_wired_node(&mut self, name: &str) -> NodeId {
        self.push_node(name, NodeKind::Wired)
    }

    /// Registers a wireless node anchored at `anchor` (or with no anchor, if `None`). A wireless
    /// node with no anchor can be registered, but every path query touching it fails with
    /// [`GraphError::IsolatedWireless`].
    pub fn add_wireless_node(&mut self, name: &str, anchor: Option<NodeId>) -> NodeId {
        self.push_node(name, NodeKind::Wireless { anchor })
    }

    pub fn node_id(&self, name: &str) -> Result<NodeId, GraphError> {
        self.name_to_id
            .get(name)
            .copied()
            .ok_or_else(|| GraphError::NodeNotFound(name.to_owned()))
    }

    pub fn node_name(&self, id: NodeId) -> &str {
        &self.nodes[id as usize].name
    }

    pub fn is_wireless(&self, id: NodeId) -> bool {
        matches!(self.nodes[id as usize].kind, NodeKind::Wireless { .. })
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        0..self.nodes.len() as NodeId
    }

    pub fn links(&self) -> impl Iterator<Item = (LinkId, &Link)> {
        self.links.iter().enumerate().filter_map(|(id, l)| l.as_ref().map(|l| (id, l)))
    }

    /// Adds a directed link `src -> dst` keyed by `key` (default `0` if omitted). Rejected if
    /// either endpoint is wireless, per the single-key-per-pair convention callers must supply a
    /// distinct `key` to create parallel edges.
    pub fn add_link(
        &mut self,
        src: NodeId,
        dst: NodeId,
        key: Option<u32>,
        max_bandwidth: f64,
        base_latency: f64,
        distance: Option<f64>,
    ) -> Result<LinkId, GraphError> {
        if self.is_wireless(src) {
            return Err(GraphError::IsolatedWireless(self.node_name(src).to_owned()));
        }
        if self.is_wireless(dst) {
            return Err(GraphError::IsolatedWireless(self.node_name(dst).to_owned()));
        }
        let key = key.unwrap_or(DEFAULT_KEY);
        let link_id = self.links.len();
        self.links.push(Some(Link::new(src, dst, max_bandwidth, base_latency, distance)));
        let dst_name = self.node_name(dst).to_owned();
        self.adjacency[src as usize].insert((dst_name, key), (dst, link_id));
        Ok(link_id)
    }

    pub fn remove_link(&mut self, link_id: LinkId) -> Result<(), GraphError> {
        let link = self.links.get_mut(link_id).ok_or(GraphError::LinkNotFound(link_id))?;
        let Some(l) = link.take() else {
            return Err(GraphError::LinkNotFound(link_id));
        };
        self.adjacency[l.src as usize].retain(|_, &mut (_, id)| id != link_id);
        Ok(())
    }

    /// Removes a node and every link touching it.
    pub fn remove_node(&mut self, id: NodeId) {
        let doomed: Vec<LinkId> = self
            .links()
            .filter(|(_, l)| l.src == id || l.dst == id)
            .map(|(id, _)| id)
            .collect();
        for link_id in doomed {
            let _ = self.remove_link(link_id);
        }
        self.adjacency[id as usize].clear();
    }

    pub fn link(&self, link_id: LinkId) -> Result<&Link, GraphError> {
        self.links.get(link_id).and_then(|l| l.as_ref()).ok_or(GraphError::LinkNotFound(link_id))
    }

    pub fn link_mut(&mut self, link_id: LinkId) -> Result<&mut Link, GraphError> {
        self.links.get_mut(link_id).and_then(|l| l.as_mut()).ok_or(GraphError::LinkNotFound(link_id))
    }

    /// Returns the link keyed `(src, dst, key)`, defaulting `key` to `0`.
    pub fn get_link(&self, src: NodeId, dst: NodeId, key: Option<u32>) -> Result<LinkId, GraphError> {
        let key = key.unwrap_or(DEFAULT_KEY);
        let dst_name = self.node_name(dst).to_owned();
        self.adjacency[src as usize]
            .get(&(dst_name, key))
            .map(|&(_, link_id)| link_id)
            .ok_or_else(|| GraphError::NoPath(self.node_name(src).to_owned(), self.node_name(dst).to_owned()))
    }

    pub(crate) fn adjacency(&self, src: NodeId) -> impl Iterator<Item = (NodeId, LinkId)> + '_ {
        self.adjacency[src as usize].values().copied()
    }

    /// Resolves a (possibly wireless) node to the wired node path-finding should actually run
    /// against, reporting whether `id` itself is wireless (and thus needs a synthetic hop
    /// prepended/appended to the real path).
    fn resolve_anchor(&self, id: NodeId) -> Result<(NodeId, bool), GraphError> {
        match &self.nodes[id as usize].kind {
            NodeKind::Wired => Ok((id, false)),
            NodeKind::Wireless { anchor: Some(anchor) } if !self.is_wireless(*anchor) => Ok((*anchor, true)),
            _ => Err(GraphError::IsolatedWireless(self.node_name(id).to_owned())),
        }
    }

    /// Returns the sequence of node ids on the shortest path from `src` to `dst`, including both
    /// endpoints.
    pub fn shortest_path(&self, src: NodeId, dst: NodeId, weight: Weight) -> Result<Vec<NodeId>, GraphError> {
        let hops = self.shortest_links(src, dst, weight)?;
        let mut path = vec![src];
        for hop in hops {
            path.push(match hop {
                Hop::Wired(link_id) => self.link(link_id)?.dst(),
                Hop::Wireless { to, .. } => to,
            });
        }
        Ok(path)
    }

    /// Returns the ordered sequence of hops from `src` to `dst`, prefixed/suffixed with synthetic
    /// wireless hops as needed.
    pub fn shortest_links(&self, src: NodeId, dst: NodeId, weight: Weight) -> Result<Vec<Hop>, GraphError> {
        if src == dst {
            return Ok(Vec::new());
        }
        let (src_anchor, src_is_wireless) = self.resolve_anchor(src)?;
        let (dst_anchor, dst_is_wireless) = self.resolve_anchor(dst)?;

        let mut hops = Vec::new();
        if src_is_wireless {
            hops.push(Hop::Wireless { from: src, to: src_anchor });
        }

        if src_anchor != dst_anchor {
            let wired = match weight {
                Weight::Hops => routing::bfs(self, src_anchor, dst_anchor),
                Weight::Distance => routing::dijkstra(self, src_anchor, dst_anchor, |l| {
                    l.distance().unwrap_or(f64::INFINITY)
                }),
                Weight::Latency => routing::dijkstra(self, src_anchor, dst_anchor, |l| l.base_latency()),
            }
            .ok_or_else(|| GraphError::NoPath(self.node_name(src).to_owned(), self.node_name(dst).to_owned()))?;
            hops.extend(wired.into_iter().map(Hop::Wired));
        }

        if dst_is_wireless {
            hops.push(Hop::Wireless { from: dst_anchor, to: dst });
        }

        Ok(hops)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shortest_links_by_hops_prefers_fewer_hops_over_raw_distance() {
        let mut g = Graph::new();
        let a = g.add_wired_node("a");
        let b = g.add_wired_node("b");
        let c = g.add_wired_node("c");
        // direct a->c is "longer" in latency but a single hop
        g.add_link(a, c, None, 10.0, 5.0, None).unwrap();
        g.add_link(a, b, None, 10.0, 1.0, None).unwrap();
        g.add_link(b, c, None, 10.0, 1.0, None).unwrap();

        let path = g.shortest_links(a, c, Weight::Hops).unwrap();
        assert_eq!(path.len(), 1);
    }

    #[test]
    fn shortest_links_by_latency_prefers_lower_total_latency() {
        let mut g = Graph::new();
        let a = g.add_wired_node("a");
        let b = g.add_wired_node("b");
        let c = g.add_wired_node("c");
        g.add_link(a, c, None, 10.0, 5.0, None).unwrap();
        g.add_link(a, b, None, 10.0, 1.0, None).unwrap();
        g.add_link(b, c, None, 10.0, 1.0, None).unwrap();

        let path = g.shortest_links(a, c, Weight::Latency).unwrap();
        assert_eq!(path.len(), 2);
    }

    #[test]
    fn no_path_is_reported_for_disconnected_nodes() {
        let mut g = Graph::new();
        let a = g.add_wired_node("a");
        let b = g.add_wired_node("b");
        assert!(matches!(g.shortest_links(a, b, Weight::Hops), Err(GraphError::NoPath(_, _))));
    }

    #[test]
    fn wireless_node_without_anchor_is_isolated() {
        let mut g = Graph::new();
        let w = g.add_wireless_node("phone", None);
        let a = g.add_wired_node("a");
        assert!(matches!(g.shortest_links(w, a, Weight::Hops), Err(GraphError::IsolatedWireless(_))));
    }

    #[test]
    fn wireless_node_resolves_through_its_anchor() {
        let mut g = Graph::new();
        let a = g.add_wired_node("a");
        let b = g.add_wired_node("b");
        g.add_link(a, b, None, 10.0, 1.0, None).unwrap();
        let w = g.add_wireless_node("phone", Some(a));

        let hops = g.shortest_links(w, b, Weight::Hops).unwrap();
        assert!(matches!(hops[0], Hop::Wireless { .. }));
        assert!(matches!(hops[1], Hop::Wired(_)));
    }
}
