//! The public facade (C11, §6.4): wraps a [`fabric_core::Simulation`] driving a single
//! [`Scheduler`] component, and is the only type most callers ever touch directly.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use fabric_compute::EnergyModel;
use fabric_core::Simulation;
use fabric_net::{Hop, NodeId, Weight};

use crate::config::{OnOff, RuntimeConfig};
use crate::errors::SubmitError;
use crate::logger::TaskRecord;
use crate::policy::{PolicyView, WholeStatus};
use crate::scenario::Scenario;
use crate::scheduler::{DoneTaskInfo, Scheduler};
use crate::task::Task;

/// Tunables that aren't part of the scenario topology itself.
#[derive(Debug, Clone)]
pub struct EnvOptions {
    /// How often, in virtual seconds, every node accrues idle energy (§4.5). A non-positive
    /// value disables idle ticking entirely, which is what makes [`Env::run_to_completion`]
    /// usable — with ticking active the event queue never empties on its own.
    pub refresh_rate: f64,
    pub energy_model: EnergyModel,
    /// Divisor applied to every energy figure `node_energy`/`average_node_energy` returns (§4.7),
    /// so callers see a canonical unit regardless of the internal accumulator's scale.
    pub energy_unit: f64,
    /// Logs every submit outcome at info level when set.
    pub verbose: bool,
    pub seed: u64,
}

impl Default for EnvOptions {
    fn default() -> Self {
        Self {
            refresh_rate: 1.0,
            energy_model: EnergyModel::default(),
            energy_unit: 1.0,
            verbose: false,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeStatus {
    pub max_cpu_hz: f64,
    pub free_cpu_hz: f64,
    pub buffer_max_size: u64,
    pub buffer_free_size: u64,
    pub energy_consumed: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkStatus {
    pub max_bandwidth: f64,
    pub free_bandwidth: f64,
    pub base_latency: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct LinkSnapshot {
    pub src: NodeId,
    pub dst: NodeId,
    pub max_bandwidth: f64,
    pub free_bandwidth: f64,
}

/// Whole-infrastructure snapshot: per-node capacity/free arrays plus every link's bandwidth
/// state. `§4.7`'s single overloaded `status(node_name?, link_key?)` becomes three distinct,
/// properly-typed methods here (`status`, `node_status`, `link_status`) — Rust has no optional
/// parameter overloading, and collapsing three different return shapes behind one `Option`-laden
/// signature would just move the dispatch into the caller.
#[derive(Debug, Clone)]
pub struct FabricStatus {
    pub node_names: Vec<String>,
    pub node_max_cpu_hz: Vec<f64>,
    pub node_free_cpu_hz: Vec<f64>,
    pub links: Vec<LinkSnapshot>,
}

/// Owns the simulation clock and the one [`Scheduler`] component registered on it.
pub struct Env {
    sim: Simulation,
    scheduler: Rc<RefCell<Scheduler>>,
    energy_unit: f64,
    verbose: bool,
}

impl Env {
    pub fn new(scenario: Scenario, runtime_config: RuntimeConfig, opts: EnvOptions) -> Self {
        let mut sim = Simulation::new(opts.seed);
        let ctx = sim.create_context("kernel");
        let scheduler = Rc::new(RefCell::new(Scheduler::new(
            scenario,
            opts.refresh_rate,
            opts.energy_model,
            ctx,
        )));
        sim.add_handler("kernel", scheduler.clone());
        scheduler.borrow().start_energy_ticks();

        if runtime_config.basic.vis_frame == OnOff::On {
            log::warn!(target: "fabric-sim", "VisFrame recording was requested but is not implemented; ignoring");
        }

        Self { sim, scheduler, energy_unit: opts.energy_unit, verbose: opts.verbose }
    }

    pub fn energy_unit(&self) -> f64 {
        self.energy_unit
    }

    /// Submits `task` for routing to `dst_name`. See [`Scheduler::submit`] for exactly which
    /// failures surface here versus only through [`Env::drain_completed`].
    pub fn submit(&mut self, task: Task, dst_name: &str) -> Result<(), SubmitError> {
        let task_id = task.id;
        let result = self.scheduler.borrow_mut().submit(task, dst_name);
        if self.verbose {
            match &result {
                Ok(()) => log::info!(target: "fabric-sim", "task {task_id} submitted to {dst_name}"),
                Err(err) => log::info!(target: "fabric-sim", "task {task_id} rejected: {err}"),
            }
        }
        result
    }

    /// Advances the clock to `until`, dispatching every event scheduled before it. A no-op if
    /// `until` is not after the current time.
    pub fn run(&mut self, until: f64) {
        let now = self.sim.time();
        if until > now {
            self.sim.step_for_duration(until - now);
        }
    }

    /// Runs until no events remain (every submitted task has reached DONE or FAILED). Only
    /// terminates when idle energy ticking is disabled (`EnvOptions::refresh_rate <= 0.0`);
    /// otherwise the recurring `EnergyTick` keeps the queue non-empty forever and [`Env::run`]
    /// with a fixed end time should be used instead.
    pub fn run_to_completion(&mut self) {
        self.sim.step_until_no_events();
    }

    pub fn now(&self) -> f64 {
        self.sim.time()
    }

    pub fn active_count(&self) -> usize {
        self.scheduler.borrow().active_count()
    }

    pub fn processed_count(&self) -> u64 {
        self.scheduler.borrow().processed_count()
    }

    /// Drains and returns every task outcome recorded since the last call.
    pub fn drain_completed(&mut self) -> Vec<DoneTaskInfo> {
        self.scheduler.borrow_mut().drain_completed()
    }

    /// Every task outcome ever recorded, keyed by task id (append-only until `reset`).
    pub fn done_task_info(&self) -> HashMap<u64, TaskRecord> {
        self.scheduler.borrow().logger.task_info().clone()
    }

    /// Snapshot of every node's CPU capacity/free and every link's bandwidth capacity/free.
    pub fn status(&self) -> FabricStatus {
        let scheduler = self.scheduler.borrow();
        let graph = scheduler.scenario.graph();
        let mut node_names = Vec::new();
        let mut node_max_cpu_hz = Vec::new();
        let mut node_free_cpu_hz = Vec::new();
        for id in graph.nodes() {
            let node = scheduler.scenario.node(id);
            node_names.push(graph.node_name(id).to_owned());
            node_max_cpu_hz.push(node.max_cpu_hz());
            node_free_cpu_hz.push(node.free_cpu_hz());
        }
        let links = graph
            .links()
            .map(|(_, link)| LinkSnapshot {
                src: link.src(),
                dst: link.dst(),
                max_bandwidth: link.max_bandwidth(),
                free_bandwidth: link.free_bandwidth(),
            })
            .collect();
        FabricStatus { node_names, node_max_cpu_hz, node_free_cpu_hz, links }
    }

    pub fn node_status(&self, name: &str) -> Option<NodeStatus> {
        let scheduler = self.scheduler.borrow();
        let id = scheduler.scenario.node_id(name)?;
        let node = scheduler.scenario.node(id);
        let buffer = node.buffer_status();
        Some(NodeStatus {
            max_cpu_hz: node.max_cpu_hz(),
            free_cpu_hz: node.free_cpu_hz(),
            buffer_max_size: buffer.max_size,
            buffer_free_size: buffer.free_size,
            energy_consumed: node.energy_consumed(),
        })
    }

    pub fn link_status(&self, src: &str, dst: &str, key: Option<u32>) -> Option<LinkStatus> {
        let scheduler = self.scheduler.borrow();
        let graph = scheduler.scenario.graph();
        let src_id = scheduler.scenario.node_id(src)?;
        let dst_id = scheduler.scenario.node_id(dst)?;
        let link_id = graph.get_link(src_id, dst_id, key).ok()?;
        let link = graph.link(link_id).ok()?;
        Some(LinkStatus {
            max_bandwidth: link.max_bandwidth(),
            free_bandwidth: link.free_bandwidth(),
            base_latency: link.base_latency(),
        })
    }

    /// Energy consumed by `name`, normalized by `EnvOptions::energy_unit` (§4.7).
    pub fn node_energy(&self, name: &str) -> Option<f64> {
        self.node_status(name).map(|s| s.energy_consumed / self.energy_unit)
    }

    /// Mean energy consumed across `names` (or every node if `None`), normalized by
    /// `EnvOptions::energy_unit` (§4.7).
    pub fn average_node_energy(&self, names: Option<&[String]>) -> f64 {
        let scheduler = self.scheduler.borrow();
        let ids: Vec<NodeId> = match names {
            Some(names) => names.iter().filter_map(|n| scheduler.scenario.node_id(n)).collect(),
            None => (0..scheduler.scenario.node_count() as NodeId).collect(),
        };
        if ids.is_empty() {
            return 0.0;
        }
        let sum: f64 = ids.iter().map(|&id| scheduler.scenario.node(id).energy_consumed()).sum();
        sum / ids.len() as f64 / self.energy_unit
    }

    /// Cancels every active task and restores every node and counter to its initial state. The
    /// clock itself is not rewound — callers that want a truly fresh run should build a new `Env`.
    pub fn reset(&mut self) {
        self.scheduler.borrow_mut().reset();
    }

    /// Stamps every node's final energy/utilization snapshot into the logger. Call once, after
    /// the last `run`/`run_to_completion`.
    pub fn close(&mut self) {
        let mut scheduler = self.scheduler.borrow_mut();
        let count = scheduler.scenario.node_count();
        for id in 0..count as u32 {
            let energy = scheduler.scenario.node(id).energy_consumed();
            let total_cpu_hz = scheduler.scenario.node(id).total_cpu_hz();
            scheduler.logger.close_node(id, energy, total_cpu_hz);
        }
    }
}

impl PolicyView for Env {
    fn whole_status(&mut self) -> WholeStatus {
        let scheduler = self.scheduler.borrow();
        let graph = scheduler.scenario.graph();
        let mut node_names = Vec::new();
        let mut node_max_cpu_hz = Vec::new();
        let mut node_free_cpu_hz = Vec::new();
        for id in graph.nodes() {
            let node = scheduler.scenario.node(id);
            node_names.push(graph.node_name(id).to_owned());
            node_max_cpu_hz.push(node.max_cpu_hz());
            node_free_cpu_hz.push(node.free_cpu_hz());
        }
        WholeStatus { node_names, node_max_cpu_hz, node_free_cpu_hz }
    }

    fn reachable_within(&mut self, src: &str, dst: &str, budget: f64) -> bool {
        let scheduler = self.scheduler.borrow();
        let Some(src_id) = scheduler.scenario.node_id(src) else { return false };
        let Some(dst_id) = scheduler.scenario.node_id(dst) else { return false };
        if src_id == dst_id {
            return true;
        }
        match scheduler.scenario.shortest_links(src_id, dst_id, Weight::Latency) {
            Ok(hops) => {
                let total: f64 = hops
                    .iter()
                    .filter_map(|h| match h {
                        Hop::Wired(link_id) => Some(
                            scheduler.scenario.graph().link(*link_id).expect("resolved hop is live").base_latency(),
                        ),
                        Hop::Wireless { .. } => None,
                    })
                    .sum();
                total <= budget
            }
            Err(_) => false,
        }
    }
}
