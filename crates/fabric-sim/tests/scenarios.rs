//! End-to-end scenarios against the public `Env` surface, one per named scenario.

use fabric_sim::{Env, EnvOptions, KernelError, RuntimeConfig, Scenario, Task};

fn two_node_scenario(n1_max_cpu_hz: f64, n1_buffer_bits: u64, bandwidth: f64, base_latency: f64) -> Scenario {
    let json = format!(
        r#"{{
            "Nodes": [
                {{"NodeType": "Node", "NodeName": "n0", "NodeId": 0, "MaxCpuFreq": 1.0, "MaxBufferSize": 1}},
                {{"NodeType": "Node", "NodeName": "n1", "NodeId": 1, "MaxCpuFreq": {n1_max_cpu_hz}, "MaxBufferSize": {n1_buffer_bits}}}
            ],
            "Edges": [
                {{"EdgeType": "Link", "SrcNodeID": 0, "DstNodeID": 1, "Bandwidth": {bandwidth}, "BaseLatency": {base_latency}}}
            ]
        }}"#
    );
    Scenario::from_json_str(&json).unwrap()
}

fn no_ticking_opts() -> EnvOptions {
    EnvOptions { refresh_rate: 0.0, ..Default::default() }
}

/// S1: two-node happy path.
#[test]
fn s1_two_node_happy_path() {
    let scenario = two_node_scenario(20.0, 1000, 100.0, 0.0);
    let mut env = Env::new(scenario, RuntimeConfig::default(), no_ticking_opts());

    let task = Task::new(1, "t1", 20, 10.0, 20.0, 1000.0, "n0");
    env.submit(task, "n1").unwrap();
    env.run_to_completion();

    assert_eq!(env.now(), 11.0);
    match &env.done_task_info()[&1u64] {
        fabric_sim::TaskRecord::Done { timings, .. } => {
            assert_eq!(*timings, [1.0, 1.0, 10.0]);
        }
        other => panic!("expected Done, got {other:?}"),
    }
}

/// S2: duplicate id.
#[test]
fn s2_duplicate_id_after_first_is_admitted() {
    let scenario = two_node_scenario(20.0, 1000, 100.0, 0.0);
    let mut env = Env::new(scenario, RuntimeConfig::default(), no_ticking_opts());

    let first = Task::new(1, "t1", 20, 10.0, 20.0, 1000.0, "n0");
    env.submit(first, "n1").unwrap();
    env.run(1.0);

    let duplicate = Task::new(1, "t1-again", 20, 10.0, 20.0, 1000.0, "n0");
    let err = env.submit(duplicate, "n1").unwrap_err();
    assert_eq!(err, KernelError::DuplicateTaskId(1));
}

/// S3: congestion — exactly `floor(bw / rate)` tasks fit a link in parallel.
#[test]
fn s3_congestion_admits_exactly_the_tasks_that_fit() {
    let scenario = two_node_scenario(20.0, 1000, 100.0, 0.0);
    let mut env = Env::new(scenario, RuntimeConfig::default(), no_ticking_opts());

    let rate = 40.0;
    let mut admitted = 0;
    let mut rejected = 0;
    for id in 1..=3u64 {
        let task = Task::new(id, "t", 400, 1.0, rate, 1000.0, "n0");
        match env.submit(task, "n1") {
            Ok(()) => admitted += 1,
            Err(KernelError::NetCongestion(..)) => rejected += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(admitted, 2); // floor(100 / 40)
    assert_eq!(rejected, 1);
    assert_eq!(env.active_count(), 2);
}

/// S4: a busy node buffers queued tasks and fails them on reactivation/admission per the rules.
#[test]
fn s4_buffering_and_timeout() {
    let scenario = two_node_scenario(1.0, 50, 100.0, 0.0);
    let mut env = Env::new(scenario, RuntimeConfig::default(), no_ticking_opts());

    // occupies n1's only CPU slot for 40s (size=40, cyc=1, cpuHz=1).
    let busy = Task::new(1, "busy", 40, 1.0, 1.0, 1000.0, "n1");
    env.submit(busy, "n1").unwrap();

    // fits the 50-bit buffer; will still be waiting when the busy task's 40s run exceeds its
    // 10s deadline.
    let queued = Task::new(2, "queued", 5, 1.0, 1.0, 10.0, "n1");
    env.submit(queued, "n1").unwrap();

    // only 45 bits free after `queued`; this one doesn't fit.
    let overflow = Task::new(3, "overflow", 60, 1.0, 1.0, 10.0, "n1");
    let err = env.submit(overflow, "n1").unwrap_err();
    assert_eq!(err, KernelError::InsufficientBuffer("n1".to_owned(), 3));

    env.run_to_completion();

    match &env.done_task_info()[&2u64] {
        fabric_sim::TaskRecord::Failed { kind, .. } => {
            assert_eq!(*kind, KernelError::Timeout(2, "n1".to_owned()));
        }
        other => panic!("expected Failed(Timeout), got {other:?}"),
    }
}

/// S5: no path to an isolated node.
#[test]
fn s5_no_path_to_isolated_node() {
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

    let task = Task::new(1, "t1", 1, 1.0, 1.0, 1000.0, "n0");
    let err = env.submit(task, "n3").unwrap_err();
    assert_eq!(err, KernelError::NoPath("n0".to_owned(), "n3".to_owned()));
}

/// S6: idle energy accrual with no tasks at all.
#[test]
fn s6_idle_energy_accrues_with_no_tasks() {
    let json = r#"{
        "Nodes": [
            {"NodeType": "Node", "NodeName": "n0", "NodeId": 0, "MaxCpuFreq": 100.0, "MaxBufferSize": 1,
             "IdleEnergyCoef": 0.01, "ExeEnergyCoef": 0.0}
        ],
        "Edges": []
    }"#;
    let scenario = Scenario::from_json_str(json).unwrap();
    let opts = EnvOptions { energy_unit: 10.0, ..EnvOptions::default() };
    let mut env = Env::new(scenario, RuntimeConfig::default(), opts);

    env.run(100.0);

    assert_eq!(env.now(), 100.0);
    let status = env.node_status("n0").unwrap();
    assert_eq!(status.energy_consumed, 100.0); // pre-normalization accumulator

    assert_eq!(env.node_energy("n0").unwrap(), 10.0); // 100 / energy_unit
    assert_eq!(env.average_node_energy(None), 10.0);
}
