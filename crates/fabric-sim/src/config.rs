//! Config and trace-file ingestion (C9, §6.1–§6.3).

use std::fs;
use std::path::Path;

use fabric_compute::EnergyCoefficients;
use fabric_net::Location;
use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;
use crate::scenario::Scenario;
use crate::task::Task;

const SIGNAL_SPEED_M_PER_S: f64 = 2e8;
const HOP_DELAY_S_PER_30KM: f64 = 0.2e-3;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
struct NodeConfig {
    #[serde(default)]
    node_type: String,
    node_name: String,
    node_id: u32,
    max_cpu_freq: f64,
    max_buffer_size: u64,
    loc_x: Option<f64>,
    loc_y: Option<f64>,
    #[serde(default)]
    idle_energy_coef: f64,
    #[serde(default)]
    exe_energy_coef: f64,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(untagged)]
enum BandwidthSpec {
    Symmetric(f64),
    Paired([f64; 2]),
}

impl BandwidthSpec {
    fn forward(&self) -> f64 {
        match self {
            BandwidthSpec::Symmetric(bw) => *bw,
            BandwidthSpec::Paired([fwd, _]) => *fwd,
        }
    }

    fn reverse(&self) -> f64 {
        match self {
            BandwidthSpec::Symmetric(bw) => *bw,
            BandwidthSpec::Paired([_, rev]) => *rev,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
struct EdgeConfig {
    #[serde(rename = "EdgeType")]
    edge_type: String,
    #[serde(rename = "SrcNodeID")]
    src_node_id: u32,
    #[serde(rename = "DstNodeID")]
    dst_node_id: u32,
    #[serde(rename = "Bandwidth")]
    bandwidth: BandwidthSpec,
    #[serde(rename = "BaseLatency")]
    base_latency: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
struct ScenarioConfigRaw {
    nodes: Vec<NodeConfig>,
    edges: Vec<EdgeConfig>,
}

/// Parsed, validated scenario config; `Scenario::from_config_file`/`from_json_str` build a
/// [`Scenario`] from one of these.
pub struct ScenarioConfig {
    raw: ScenarioConfigRaw,
}

impl ScenarioConfig {
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let raw: ScenarioConfigRaw = serde_json::from_str(s)?;
        validate_dense_ids(&raw.nodes)?;
        Ok(Self { raw })
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_json_str(&fs::read_to_string(path)?)
    }

    /// Builds the [`Scenario`] (graph + compute nodes) this config describes.
    pub(crate) fn build(&self) -> Result<Scenario, ConfigError> {
        let mut scenario = Scenario::empty();

        for node in &self.raw.nodes {
            let location = match (node.loc_x, node.loc_y) {
                (Some(x), Some(y)) => Some(Location::new(x, y)),
                _ => None,
            };
            scenario.add_wired_node(
                &node.node_name,
                node.max_cpu_freq,
                node.max_buffer_size,
                location,
                EnergyCoefficients { idle: node.idle_energy_coef, exe: node.exe_energy_coef },
            );
        }

        for edge in &self.raw.edges {
            let src = &self.raw.nodes[edge.src_node_id as usize];
            let dst = &self.raw.nodes[edge.dst_node_id as usize];
            let src_name = src.node_name.clone();
            let dst_name = dst.node_name.clone();

            let distance = match (src.loc_x, src.loc_y, dst.loc_x, dst.loc_y) {
                (Some(sx), Some(sy), Some(dx), Some(dy)) => Some(Location::new(sx, sy).euclidean_distance(&Location::new(dx, dy))),
                _ => None,
            };

            let base_latency = match edge.base_latency {
                Some(l) => l,
                None => {
                    let distance = distance.ok_or_else(|| ConfigError::MissingLocationForLatency(src_name, dst_name))?;
                    round3(2.0 * distance * (1.0 / SIGNAL_SPEED_M_PER_S + HOP_DELAY_S_PER_30KM / 30_000.0))
                }
            };

            match edge.edge_type.as_str() {
                "Link" => {
                    scenario.add_link(edge.src_node_id, edge.dst_node_id, edge.bandwidth.forward(), base_latency, distance)?;
                    scenario.add_link(edge.dst_node_id, edge.src_node_id, edge.bandwidth.reverse(), base_latency, distance)?;
                }
                "SingleLink" => {
                    scenario.add_link(edge.src_node_id, edge.dst_node_id, edge.bandwidth.forward(), base_latency, distance)?;
                }
                other => return Err(ConfigError::UnknownEdgeType(other.to_owned())),
            }
        }

        Ok(scenario)
    }
}

fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}

fn validate_dense_ids(nodes: &[NodeConfig]) -> Result<(), ConfigError> {
    let mut seen = vec![false; nodes.len()];
    for node in nodes {
        let idx = node.node_id as usize;
        if idx >= nodes.len() || seen[idx] {
            return Err(ConfigError::NonDenseNodeIds);
        }
        seen[idx] = true;
    }
    Ok(())
}

/// Runtime config (§6.3): the kernel only ever reads `basic.vis_frame`'s presence; `vis_frame`'s
/// body is surfaced for an out-of-scope frame recorder.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RuntimeConfig {
    #[serde(rename = "Basic")]
    pub basic: BasicConfig,
    #[serde(rename = "VisFrame")]
    pub vis_frame: Option<VisFrameConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BasicConfig {
    #[serde(rename = "VisFrame")]
    pub vis_frame: OnOff,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum OnOff {
    #[serde(rename = "on")]
    On,
    #[serde(rename = "off")]
    Off,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VisFrameConfig {
    #[serde(rename = "TargetNodeList")]
    pub target_node_list: Vec<String>,
    #[serde(rename = "LogInfoPath")]
    pub log_info_path: String,
    #[serde(rename = "LogFramesPath")]
    pub log_frames_path: String,
}

impl RuntimeConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
    }
}

impl Default for RuntimeConfig {
    /// VisFrame off, no frame recorder config — what most callers that don't care about
    /// visualization want.
    fn default() -> Self {
        Self { basic: BasicConfig { vis_frame: OnOff::Off }, vis_frame: None }
    }
}

/// One row of a task trace CSV (§6.2).
#[derive(Debug, Clone, Deserialize)]
struct TaskTraceRow {
    #[serde(rename = "TaskName")]
    task_name: String,
    #[serde(rename = "GenerationTime")]
    generation_time: f64,
    #[serde(rename = "TaskID")]
    task_id: u64,
    #[serde(rename = "TaskSize")]
    task_size: u64,
    #[serde(rename = "CyclesPerBit")]
    cycles_per_bit: f64,
    #[serde(rename = "TransBitRate")]
    trans_bit_rate: f64,
    #[serde(rename = "DDL")]
    ddl: f64,
    #[serde(rename = "SrcName")]
    src_name: String,
}

/// A task trace: `(generation_time, task)` pairs read from a CSV, ingested in `GenerationTime`
/// order. Destination is not part of the trace — the driver supplies it via a [`crate::Policy`].
pub struct TaskTrace {
    entries: Vec<(f64, Task)>,
}

impl TaskTrace {
    pub fn from_csv_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut entries = Vec::new();
        for record in reader.deserialize() {
            let row: TaskTraceRow = record?;
            let task = Task::new(
                row.task_id,
                &row.task_name,
                row.task_size,
                row.cycles_per_bit,
                row.trans_bit_rate,
                row.ddl,
                &row.src_name,
            );
            entries.push((row.generation_time, task));
        }
        entries.sort_by(|a, b| a.0.total_cmp(&b.0));
        Ok(Self { entries })
    }

    pub fn into_entries(self) -> Vec<(f64, Task)> {
        self.entries
    }

    pub fn entries(&self) -> &[(f64, Task)] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: u32, name: &str) -> NodeConfig {
        NodeConfig {
            node_type: "Node".to_owned(),
            node_name: name.to_owned(),
            node_id: id,
            max_cpu_freq: 1000.0,
            max_buffer_size: 100,
            loc_x: None,
            loc_y: None,
            idle_energy_coef: 0.0,
            exe_energy_coef: 0.0,
        }
    }

    #[test]
    fn round3_rounds_to_three_decimal_places() {
        assert_eq!(round3(0.123456), 0.123);
        assert_eq!(round3(0.1235), 0.124);
    }

    #[test]
    fn validate_dense_ids_accepts_zero_based_permutation() {
        let nodes = vec![node(1, "a"), node(0, "b")];
        assert!(validate_dense_ids(&nodes).is_ok());
    }

    #[test]
    fn validate_dense_ids_rejects_gap() {
        let nodes = vec![node(0, "a"), node(2, "b")];
        assert!(matches!(validate_dense_ids(&nodes), Err(ConfigError::NonDenseNodeIds)));
    }

    #[test]
    fn validate_dense_ids_rejects_duplicate() {
        let nodes = vec![node(0, "a"), node(0, "b")];
        assert!(matches!(validate_dense_ids(&nodes), Err(ConfigError::NonDenseNodeIds)));
    }

    #[test]
    fn scenario_config_builds_graph_from_json() {
        let json = r#"{
            "Nodes": [
                {"NodeType": "Node", "NodeName": "n0", "NodeId": 0, "MaxCpuFreq": 10.0, "MaxBufferSize": 100,
                 "IdleEnergyCoef": 0.01, "ExeEnergyCoef": 0.1},
                {"NodeType": "Node", "NodeName": "n1", "NodeId": 1, "MaxCpuFreq": 10.0, "MaxBufferSize": 100,
                 "IdleEnergyCoef": 0.01, "ExeEnergyCoef": 0.1}
            ],
            "Edges": [
                {"EdgeType": "Link", "SrcNodeID": 0, "DstNodeID": 1, "Bandwidth": 100.0, "BaseLatency": 0.0}
            ]
        }"#;
        let scenario = ScenarioConfig::from_json_str(json).unwrap().build().unwrap();
        assert_eq!(scenario.node_count(), 2);
        assert!(scenario.node_id("n0").is_some());
    }
}
