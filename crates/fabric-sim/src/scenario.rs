//! The infrastructure facade (C7): graph + compute nodes, built once at load time.

use fabric_compute::{EnergyCoefficients, Node};
use fabric_net::{Graph, Hop, LinkId, Location, NodeId, Weight};

use crate::config::ScenarioConfig;
use crate::errors::ConfigError;
use crate::task::Task;

/// A compute node as the scheduler sees it: CPU/buffer state plus its queued [`Task`]s.
pub type ComputeNode = Node<Task>;

/// Owns the [`Graph`] and every [`ComputeNode`] for the lifetime of a run. Nodes and links are
/// created once at load time and live until the `Scenario` is dropped.
pub struct Scenario {
    pub(crate) graph: Graph,
    pub(crate) nodes: Vec<ComputeNode>,
}

impl Scenario {
    pub(crate) fn empty() -> Self {
        Self { graph: Graph::new(), nodes: Vec::new() }
    }

    pub fn from_config_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        ScenarioConfig::from_json_file(path)?.build()
    }

    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        ScenarioConfig::from_json_str(s)?.build()
    }

    pub(crate) fn add_wired_node(
        &mut self,
        name: &str,
        max_cpu_hz: f64,
        buffer_capacity_bits: u64,
        location: Option<Location>,
        coefficients: EnergyCoefficients,
    ) -> NodeId {
        let id = self.graph.add_wired_node(name);
        self.nodes.push(Node::new(id, name, max_cpu_hz, buffer_capacity_bits, location, coefficients, false));
        id
    }

    pub(crate) fn add_link(
        &mut self,
        src: NodeId,
        dst: NodeId,
        max_bandwidth: f64,
        base_latency: f64,
        distance: Option<f64>,
    ) -> Result<LinkId, ConfigError> {
        // `Graph::add_link`'s only failure mode is `IsolatedWireless`, and `ScenarioConfig::build`
        // never registers a wireless node, so this can't fire today. A future wireless-aware config
        // loader that hits this will need to route a real `ConfigError` through here instead.
        Ok(self
            .graph
            .add_link(src, dst, None, max_bandwidth, base_latency, distance)
            .expect("add_link never registers a wireless node"))
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub(crate) fn graph_mut(&mut self) -> &mut Graph {
        &mut self.graph
    }

    pub fn node_id(&self, name: &str) -> Option<NodeId> {
        self.graph.node_id(name).ok()
    }

    pub fn node(&self, id: NodeId) -> &ComputeNode {
        &self.nodes[id as usize]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut ComputeNode {
        &mut self.nodes[id as usize]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Shortest hop-count path between two node names, for `Policy::reachable_within`-style
    /// queries and for default routing (§4.4).
    pub fn shortest_links(&self, src: NodeId, dst: NodeId, weight: Weight) -> Result<Vec<Hop>, fabric_net::GraphError> {
        self.graph.shortest_links(src, dst, weight)
    }

    pub fn reset(&mut self) {
        for node in &mut self.nodes {
            node.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const THREE_NODE_JSON: &str = r#"{
        "Nodes": [
            {"NodeType": "Node", "NodeName": "edge", "NodeId": 0, "MaxCpuFreq": 10.0, "MaxBufferSize": 100},
            {"NodeType": "Node", "NodeName": "fog", "NodeId": 1, "MaxCpuFreq": 100.0, "MaxBufferSize": 1000},
            {"NodeType": "Node", "NodeName": "cloud", "NodeId": 2, "MaxCpuFreq": 1000.0, "MaxBufferSize": 10000}
        ],
        "Edges": [
            {"EdgeType": "Link", "SrcNodeID": 0, "DstNodeID": 1, "Bandwidth": 50.0, "BaseLatency": 0.01},
            {"EdgeType": "SingleLink", "SrcNodeID": 1, "DstNodeID": 2, "Bandwidth": 200.0, "BaseLatency": 0.1}
        ]
    }"#;

    #[test]
    fn from_json_str_builds_nodes_and_links() {
        let scenario = Scenario::from_json_str(THREE_NODE_JSON).unwrap();
        assert_eq!(scenario.node_count(), 3);
        assert_eq!(scenario.node_id("cloud"), Some(2));
        assert_eq!(scenario.node(1).max_cpu_hz(), 100.0);
    }

    #[test]
    fn bidirectional_link_creates_edges_both_ways() {
        let scenario = Scenario::from_json_str(THREE_NODE_JSON).unwrap();
        let edge = scenario.node_id("edge").unwrap();
        let fog = scenario.node_id("fog").unwrap();
        assert!(scenario.shortest_links(edge, fog, Weight::Hops).unwrap().len() == 1);
        assert!(scenario.shortest_links(fog, edge, Weight::Hops).unwrap().len() == 1);
    }

    #[test]
    fn single_link_is_one_directional() {
        let scenario = Scenario::from_json_str(THREE_NODE_JSON).unwrap();
        let fog = scenario.node_id("fog").unwrap();
        let cloud = scenario.node_id("cloud").unwrap();
        assert!(scenario.shortest_links(fog, cloud, Weight::Hops).is_ok());
        assert!(scenario.shortest_links(cloud, fog, Weight::Hops).is_err());
    }

    #[test]
    fn reset_restores_node_state_after_use() {
        let mut scenario = Scenario::from_json_str(THREE_NODE_JSON).unwrap();
        let fog = scenario.node_id("fog").unwrap();
        scenario.node_mut(fog).acquire(1).unwrap();
        assert_eq!(scenario.node(fog).free_cpu_hz(), 0.0);

        scenario.reset();
        assert_eq!(scenario.node(fog).free_cpu_hz(), scenario.node(fog).max_cpu_hz());
    }
}
