//! The six named scenarios, built and run against the public `Env` surface.

use fabric_sim::{Env, EnvOptions, RuntimeConfig, Scenario, Task};

fn no_ticking_opts() -> EnvOptions {
    EnvOptions { refresh_rate: 0.0, ..Default::default() }
}

fn two_node_json(n1_max_cpu_hz: f64, n1_buffer_bits: u64, bandwidth: f64) -> String {
    format!(
        r#"{{
            "Nodes": [
                {{"NodeType": "Node", "NodeName": "n0", "NodeId": 0, "MaxCpuFreq": 1.0, "MaxBufferSize": 1}},
                {{"NodeType": "Node", "NodeName": "n1", "NodeId": 1, "MaxCpuFreq": {n1_max_cpu_hz}, "MaxBufferSize": {n1_buffer_bits}}}
            ],
            "Edges": [
                {{"EdgeType": "Link", "SrcNodeID": 0, "DstNodeID": 1, "Bandwidth": {bandwidth}, "BaseLatency": 0.0}}
            ]
        }}"#
    )
}

pub fn s1_happy_path() -> String {
    let scenario = Scenario::from_json_str(&two_node_json(20.0, 1000, 100.0)).unwrap();
    let mut env = Env::new(scenario, RuntimeConfig::default(), no_ticking_opts());
    env.submit(Task::new(1, "t1", 20, 10.0, 20.0, 1000.0, "n0"), "n1").unwrap();
    env.run_to_completion();
    format!("done at t={}, {:?}", env.now(), env.done_task_info().get(&1u64))
}

pub fn s2_duplicate_id() -> String {
    let scenario = Scenario::from_json_str(&two_node_json(20.0, 1000, 100.0)).unwrap();
    let mut env = Env::new(scenario, RuntimeConfig::default(), no_ticking_opts());
    env.submit(Task::new(1, "t1", 20, 10.0, 20.0, 1000.0, "n0"), "n1").unwrap();
    env.run(1.0);
    let err = env.submit(Task::new(1, "t1-again", 20, 10.0, 20.0, 1000.0, "n0"), "n1");
    format!("re-submit same id: {err:?}")
}

pub fn s3_congestion() -> String {
    let scenario = Scenario::from_json_str(&two_node_json(20.0, 1000, 100.0)).unwrap();
    let mut env = Env::new(scenario, RuntimeConfig::default(), no_ticking_opts());
    let mut outcomes = Vec::new();
    for id in 1..=3u64 {
        let result = env.submit(Task::new(id, "t", 400, 1.0, 40.0, 1000.0, "n0"), "n1");
        outcomes.push(format!("task {id}: {}", if result.is_ok() { "admitted".to_owned() } else { format!("{:?}", result.unwrap_err()) }));
    }
    outcomes.join(", ")
}

pub fn s4_buffering_and_timeout() -> String {
    let scenario = Scenario::from_json_str(&two_node_json(1.0, 50, 100.0)).unwrap();
    let mut env = Env::new(scenario, RuntimeConfig::default(), no_ticking_opts());
    env.submit(Task::new(1, "busy", 40, 1.0, 1.0, 1000.0, "n1"), "n1").unwrap();
    env.submit(Task::new(2, "queued", 5, 1.0, 1.0, 10.0, "n1"), "n1").unwrap();
    let overflow = env.submit(Task::new(3, "overflow", 60, 1.0, 1.0, 10.0, "n1"), "n1");
    env.run_to_completion();
    format!("overflow rejected: {overflow:?}, queued outcome: {:?}", env.done_task_info().get(&2u64))
}

pub fn s5_no_path() -> String {
    let json = r#"{
        "Nodes": [
            {"NodeType": "Node", "NodeName": "n0", "NodeId": 0, "MaxCpuFreq": 1.0, "MaxBufferSize": 1},
            {"NodeType": "Node", "NodeName": "n1", "NodeId": 1, "MaxCpuFreq": 1.0, "MaxBufferSize": 1},
            {"NodeType": "Node", "NodeName": "n3", "NodeId": 2, "MaxCpuFreq": 1.0, "MaxBufferSize": 1}
        ],
        "Edges": [
            {"EdgeType": "Link", "SrcNodeID": 0, "DstNodeID": 1, "Bandwidth": 10.0, "BaseLatency": 0.0}
        ]
    }"#;
    let scenario = Scenario::from_json_str(json).unwrap();
    let mut env = Env::new(scenario, RuntimeConfig::default(), no_ticking_opts());
    let err = env.submit(Task::new(1, "t1", 1, 1.0, 1.0, 1000.0, "n0"), "n3");
    format!("submit to isolated node: {err:?}")
}

pub fn s6_idle_energy() -> String {
    let json = r#"{
        "Nodes": [
            {"NodeType": "Node", "NodeName": "n0", "NodeId": 0, "MaxCpuFreq": 100.0, "MaxBufferSize": 1,
             "IdleEnergyCoef": 0.01, "ExeEnergyCoef": 0.0}
        ],
        "Edges": []
    }"#;
    let scenario = Scenario::from_json_str(json).unwrap();
    let mut env = Env::new(scenario, RuntimeConfig::default(), EnvOptions::default());
    env.run(100.0);
    format!("idle energy after 100s: {:?}", env.node_energy("n0"))
}
