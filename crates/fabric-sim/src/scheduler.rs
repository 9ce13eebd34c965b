//! The event-driven scheduler kernel (C6).
//!
//! Task "coroutines" are not `async fn`s: each task's progression through
//! ROUTING -> TRANSMITTING -> ADMIT -> EXECUTING/QUEUED -> DONE/FAILED is explicit per-task state
//! living in [`Scheduler::active`], driven by self-scheduled events matched in
//! [`fabric_core::EventHandler::on`] — the same shape as the teacher's actor components.

use std::collections::{HashMap, VecDeque};

use fabric_compute::EnergyModel;
use fabric_core::{cast, log_debug, Event, EventHandler, SimulationContext};
use fabric_net::{DataFlow, GraphError, Hop, NodeId, Weight};
use serde::Serialize;

use crate::errors::KernelError;
use crate::logger::Logger;
use crate::scenario::Scenario;
use crate::task::Task;

#[derive(Debug, Clone, Serialize)]
struct TransmitComplete {
    task_id: u64,
}

#[derive(Debug, Clone, Serialize)]
struct ExecComplete {
    task_id: u64,
}

#[derive(Debug, Clone, Serialize)]
struct DrainTick {
    node_id: NodeId,
    task_id: u64,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct EnergyTick;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TaskState {
    Transmitting,
    Queued,
    Executing,
}

struct ActiveTask {
    task: Task,
    dst: NodeId,
    state: TaskState,
    flow: Option<DataFlow>,
}

/// A drained completion tuple, mirroring the upstream's `done_task_collector` handoff.
#[derive(Debug, Clone)]
pub struct DoneTaskInfo {
    pub task_id: u64,
    pub dst_name: String,
    pub outcome: Result<(), KernelError>,
}

/// Owns the scenario, the active-task table and the completion channel; drives the whole task
/// lifecycle through self-scheduled events on a `fabric_core::Simulation`.
pub struct Scheduler {
    pub(crate) scenario: Scenario,
    pub(crate) logger: Logger,
    active: HashMap<u64, ActiveTask>,
    completion_channel: VecDeque<DoneTaskInfo>,
    processed_count: u64,
    refresh_rate: f64,
    energy_model: EnergyModel,
    ctx: SimulationContext,
}

impl Scheduler {
    pub(crate) fn new(
        scenario: Scenario,
        refresh_rate: f64,
        energy_model: EnergyModel,
        ctx: SimulationContext,
    ) -> Self {
        Self {
            scenario,
            logger: Logger::new(),
            active: HashMap::new(),
            completion_channel: VecDeque::new(),
            processed_count: 0,
            refresh_rate,
            energy_model,
            ctx,
        }
    }

    /// Schedules the first recurring [`EnergyTick`]. A non-positive `refresh_rate` disables idle
    /// energy accounting entirely rather than emitting a zero-delay self-tick forever.
    pub(crate) fn start_energy_ticks(&self) {
        if self.refresh_rate > 0.0 {
            self.ctx.emit_self(EnergyTick, self.refresh_rate);
        }
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn processed_count(&self) -> u64 {
        self.processed_count
    }

    pub fn drain_completed(&mut self) -> Vec<DoneTaskInfo> {
        self.completion_channel.drain(..).collect()
    }

    pub(crate) fn reset(&mut self) {
        self.active.clear();
        self.completion_channel.clear();
        self.processed_count = 0;
        self.scenario.reset();
        self.logger.reset();
    }

    /// Synchronous part of §4.4: resolves routing and, for a direct (same-node) submission,
    /// admission too, all within the call. Outcomes only discoverable later — congestion and
    /// buffer-full after a routed transmission, timeout on reactivation — never surface here;
    /// they reach the caller only through [`Scheduler::drain_completed`].
    pub fn submit(&mut self, task: Task, dst_name: &str) -> Result<(), KernelError> {
        if self.active.contains_key(&task.id) {
            return Err(KernelError::DuplicateTaskId(task.id));
        }
        let src_id = self
            .scenario
            .node_id(&task.src_name)
            .ok_or_else(|| KernelError::NotFound(task.src_name.clone()))?;
        let dst_id = self
            .scenario
            .node_id(dst_name)
            .ok_or_else(|| KernelError::NotFound(dst_name.to_owned()))?;

        if src_id == dst_id {
            let mut task = task;
            task.trans_time = 0.0;
            return self.admit_or_queue(task, dst_id, true);
        }

        let hops = self
            .scenario
            .shortest_links(src_id, dst_id, Weight::Hops)
            .map_err(map_graph_error)?;
        let wired: Vec<_> = hops
            .iter()
            .filter_map(|h| match h {
                Hop::Wired(link_id) => Some(*link_id),
                Hop::Wireless { .. } => None,
            })
            .collect();
        let hop_count = wired.len() as f64;
        let base_latency: f64 = wired
            .iter()
            .map(|&link_id| {
                self.scenario
                    .graph()
                    .link(link_id)
                    .expect("resolved hop is a live link")
                    .base_latency()
            })
            .sum();

        let mut task = task;
        task.trans_time = base_latency + (task.size as f64 / task.trans_bit_rate) * hop_count;

        let mut flow = DataFlow::new(wired, task.trans_bit_rate);
        if flow.place(self.scenario.graph_mut()).is_err() {
            let err = KernelError::NetCongestion(task.src_name.clone(), dst_name.to_owned());
            self.fail(task, dst_id, err.clone());
            return Err(err);
        }

        let task_id = task.id;
        let trans_time = task.trans_time;
        self.active.insert(
            task_id,
            ActiveTask { task, dst: dst_id, state: TaskState::Transmitting, flow: Some(flow) },
        );
        self.ctx.emit_self(TransmitComplete { task_id }, trans_time);
        Ok(())
    }

    /// Performs acquire-or-enqueue admission. `synchronous` distinguishes the direct (same-node)
    /// submission path, whose failures must propagate to the caller, from the post-transmission
    /// path, whose failures only ever reach the logger/completion channel.
    fn admit_or_queue(&mut self, mut task: Task, dst_id: NodeId, synchronous: bool) -> Result<(), KernelError> {
        let dst_name = self.scenario.graph().node_name(dst_id).to_owned();
        let node = self.scenario.node_mut(dst_id);
        if node.acquire(task.id).is_ok() {
            task.cpu_hz = node.max_cpu_hz();
            task.wait_time = task.trans_time;
            task.exec_time = (task.size as f64 * task.cycles_per_bit) / task.cpu_hz;
            let exec_time = task.exec_time;
            let task_id = task.id;
            self.active.insert(task_id, ActiveTask { task, dst: dst_id, state: TaskState::Executing, flow: None });
            self.ctx.emit_self(ExecComplete { task_id }, exec_time);
            return Ok(());
        }

        task.wait_time = self.ctx.time();
        let task_id = task.id;
        let node = self.scenario.node_mut(dst_id);
        if node.append_to_buffer(task.clone()).is_ok() {
            self.active.insert(task_id, ActiveTask { task, dst: dst_id, state: TaskState::Queued, flow: None });
            return Ok(());
        }

        let err = KernelError::InsufficientBuffer(dst_name, task_id);
        self.fail(task, dst_id, err.clone());
        if synchronous {
            Err(err)
        } else {
            Ok(())
        }
    }

    /// Records a task's terminal failure and clears any bookkeeping still held for it.
    fn fail(&mut self, task: Task, dst_id: NodeId, kind: KernelError) {
        self.active.remove(&task.id);
        let dst_name = self.scenario.graph().node_name(dst_id).to_owned();
        self.logger
            .record_failed(task.id, (task.src_name.clone(), dst_name.clone()), kind.clone(), task.exec_energy);
        self.processed_count += 1;
        self.completion_channel.push_back(DoneTaskInfo { task_id: task.id, dst_name, outcome: Err(kind) });
    }

    fn transmit_complete(&mut self, task_id: u64) {
        let Some(mut active) = self.active.remove(&task_id) else { return };
        if let Some(mut flow) = active.flow.take() {
            flow.release(self.scenario.graph_mut());
        }
        let dst = active.dst;
        let _ = self.admit_or_queue(active.task, dst, false);
    }

    fn exec_complete(&mut self, task_id: u64) {
        let Some(active) = self.active.get(&task_id) else { return };
        if active.state != TaskState::Executing {
            return;
        }
        let node_id = active.dst;
        let busy_cpu_hz = self.scenario.node(node_id).max_cpu_hz();
        let exe_coef = self.scenario.node(node_id).exe_energy_coefficient();
        let exec_time = active.task.exec_time;
        let exec_energy = self.energy_model.exec_energy(exe_coef, busy_cpu_hz, exec_time);

        let active = self.active.get_mut(&task_id).unwrap();
        active.task.exec_energy = exec_energy;
        self.scenario.node_mut(node_id).credit_exec_energy(exec_energy);

        self.ctx.emit_self_now(DrainTick { node_id, task_id });
    }

    /// Releases the CPU, logs the outcome, then tries to admit the node's next buffered task
    /// (if any) — release, then pop, then admit, all within this one handler invocation, which is
    /// what keeps the ordering deterministic regardless of how many tasks share a node's buffer.
    fn drain_tick(&mut self, node_id: NodeId, task_id: u64) {
        let Some(active) = self.active.remove(&task_id) else { return };
        self.scenario.node_mut(node_id).release(task_id);

        let dst_name = self.scenario.graph().node_name(node_id).to_owned();
        let task = active.task;
        self.logger.record_done(
            task.id,
            (task.src_name.clone(), dst_name.clone()),
            [task.trans_time, task.wait_time, task.exec_time],
            [task.trans_energy, task.exec_energy],
        );
        self.processed_count += 1;
        self.completion_channel.push_back(DoneTaskInfo { task_id: task.id, dst_name: dst_name.clone(), outcome: Ok(()) });

        log_debug!(self.ctx, "task {} done at {}", task.id, dst_name);

        if let Some(next) = self.scenario.node_mut(node_id).pop_buffer() {
            self.reactivate(next, node_id);
        }
    }

    /// Reactivates the node's just-popped head task. A timed-out head must not leave the rest of
    /// the buffer stranded behind it — the node is idle with nothing left to ever drain it — so
    /// on Timeout this keeps popping and retrying against the next buffered task until one is
    /// admitted or the buffer runs dry.
    fn reactivate(&mut self, mut task: Task, node_id: NodeId) {
        loop {
            let now = self.ctx.time();
            let elapsed = (now - task.wait_time) + task.trans_time;
            task.wait_time = elapsed;

            if elapsed > task.deadline {
                let dst_name = self.scenario.graph().node_name(node_id).to_owned();
                let err = KernelError::Timeout(task.id, dst_name);
                self.fail(task, node_id, err);
                match self.scenario.node_mut(node_id).pop_buffer() {
                    Some(next) => {
                        task = next;
                        continue;
                    }
                    None => return,
                }
            }

            let node = self.scenario.node_mut(node_id);
            node.acquire(task.id).expect("node was just drained, CPU must be free");
            task.cpu_hz = node.max_cpu_hz();
            task.exec_time = (task.size as f64 * task.cycles_per_bit) / task.cpu_hz;
            let exec_time = task.exec_time;
            let task_id = task.id;
            self.active.insert(task_id, ActiveTask { task, dst: node_id, state: TaskState::Executing, flow: None });
            self.ctx.emit_self(ExecComplete { task_id }, exec_time);
            return;
        }
    }

    fn energy_tick(&mut self) {
        for id in 0..self.scenario.node_count() as NodeId {
            self.scenario.node_mut(id).tick_idle_energy(self.refresh_rate);
        }
        self.ctx.emit_self(EnergyTick, self.refresh_rate);
    }
}

impl EventHandler for Scheduler {
    fn on(&mut self, event: Event) {
        cast!(match event.data {
            TransmitComplete { task_id } => {
                self.transmit_complete(task_id);
            }
            ExecComplete { task_id } => {
                self.exec_complete(task_id);
            }
            DrainTick { node_id, task_id } => {
                self.drain_tick(node_id, task_id);
            }
            EnergyTick {} => {
                self.energy_tick();
            }
        })
    }
}

fn map_graph_error(err: GraphError) -> KernelError {
    match err {
        GraphError::NoPath(src, dst) => KernelError::NoPath(src, dst),
        GraphError::IsolatedWireless(name) => KernelError::IsolatedWireless(name),
        GraphError::NodeNotFound(name) => KernelError::NotFound(name),
        GraphError::LinkNotFound(id) => KernelError::NotFound(format!("link {id}")),
        GraphError::InsufficientBandwidth(_) => KernelError::NetCongestion(String::new(), String::new()),
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use fabric_core::Simulation;

    use super::*;
    use crate::scenario::Scenario;

    const TWO_NODE_JSON: &str = r#"{
        "Nodes": [
            {"NodeType": "Node", "NodeName": "n0", "NodeId": 0, "MaxCpuFreq": 1.0, "MaxBufferSize": 1},
            {"NodeType": "Node", "NodeName": "n1", "NodeId": 1, "MaxCpuFreq": 100000.0, "MaxBufferSize": 10000000}
        ],
        "Edges": [
            {"EdgeType": "SingleLink", "SrcNodeID": 0, "DstNodeID": 1, "Bandwidth": 1000000.0, "BaseLatency": 0.0}
        ]
    }"#;

    fn rig(json: &str) -> (Simulation, Rc<RefCell<Scheduler>>) {
        let scenario = Scenario::from_json_str(json).unwrap();
        let mut sim = Simulation::new(1);
        let ctx = sim.create_context("kernel");
        let scheduler = Rc::new(RefCell::new(Scheduler::new(scenario, 1.0, EnergyModel::default(), ctx)));
        sim.add_handler("kernel", scheduler.clone());
        (sim, scheduler)
    }

    fn task(id: u64, size: u64, trans_bit_rate: f64, cycles_per_bit: f64, deadline: f64) -> Task {
        Task::new(id, "t", size, cycles_per_bit, trans_bit_rate, deadline, "n0")
    }

    #[test]
    fn happy_path_two_node_transfer_then_execute() {
        let (mut sim, scheduler) = rig(TWO_NODE_JSON);
        let t = task(1, 1_000_000, 1_000_000.0, 1.0, 1000.0);
        scheduler.borrow_mut().submit(t, "n1").unwrap();

        sim.step_until_no_events();

        assert_eq!(sim.time(), 11.0);
        assert_eq!(scheduler.borrow().processed_count(), 1);
        assert_eq!(scheduler.borrow().active_count(), 0);
        match &scheduler.borrow().logger.task_info()[&1u64] {
            crate::logger::TaskRecord::Done { timings, .. } => {
                assert_eq!(timings, &[1.0, 1.0, 10.0]);
            }
            other => panic!("expected Done, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_task_id_is_rejected_while_active() {
        let (mut sim, scheduler) = rig(TWO_NODE_JSON);
        let t1 = task(1, 1_000_000, 1_000_000.0, 1.0, 1000.0);
        scheduler.borrow_mut().submit(t1, "n1").unwrap();

        let t1_again = task(1, 1_000_000, 1_000_000.0, 1.0, 1000.0);
        let err = scheduler.borrow_mut().submit(t1_again, "n1").unwrap_err();
        assert_eq!(err, KernelError::DuplicateTaskId(1));

        sim.step_until_no_events();

        // once drained, the id is free to reuse
        let t1_reused = task(1, 1_000_000, 1_000_000.0, 1.0, 1000.0);
        assert!(scheduler.borrow_mut().submit(t1_reused, "n1").is_ok());
    }

    #[test]
    fn congestion_rejects_a_task_that_does_not_fit_remaining_bandwidth() {
        let (_sim, scheduler) = rig(TWO_NODE_JSON);
        let first = task(1, 1_000_000, 1_000_000.0, 1.0, 1000.0);
        assert!(scheduler.borrow_mut().submit(first, "n1").is_ok());

        // the link's whole 1_000_000 bps is already reserved by `first`
        let second = task(2, 1_000_000, 1.0, 1.0, 1000.0);
        let err = scheduler.borrow_mut().submit(second, "n1").unwrap_err();
        assert_eq!(err, KernelError::NetCongestion("n0".to_owned(), "n1".to_owned()));
        assert_eq!(scheduler.borrow().active_count(), 1);
    }

    #[test]
    fn buffered_task_is_admitted_after_the_running_one_drains() {
        // both tasks submitted directly at n1 so neither touches the link/`DataFlow`, isolating
        // the CPU-busy -> buffer -> drain -> reactivate path.
        let (mut sim, scheduler) = rig(TWO_NODE_JSON);
        let first = Task::new(1, "t1", 1_000_000, 1.0, 1_000_000.0, 1000.0, "n1");
        scheduler.borrow_mut().submit(first, "n1").unwrap();
        assert_eq!(scheduler.borrow().active_count(), 1);

        let second = Task::new(2, "t2", 8, 1.0, 1_000_000.0, 1000.0, "n1");
        scheduler.borrow_mut().submit(second, "n1").unwrap();
        assert_eq!(scheduler.borrow().active_count(), 2);

        sim.step_until_no_events();

        assert_eq!(scheduler.borrow().processed_count(), 2);
        assert!(matches!(
            scheduler.borrow().logger.task_info()[&2u64],
            crate::logger::TaskRecord::Done { .. }
        ));
    }

    #[test]
    fn a_timed_out_head_does_not_strand_the_task_queued_behind_it() {
        // n1 has a single, slow CPU and a buffer big enough to hold two queued tasks behind a
        // long-running predecessor. The head of the queue has too short a deadline to survive the
        // predecessor's run and times out on reactivation; the second queued task has a deadline
        // long enough to survive and must still get its turn on the CPU.
        const JSON: &str = r#"{
            "Nodes": [
                {"NodeType": "Node", "NodeName": "n0", "NodeId": 0, "MaxCpuFreq": 1.0, "MaxBufferSize": 1},
                {"NodeType": "Node", "NodeName": "n1", "NodeId": 1, "MaxCpuFreq": 1.0, "MaxBufferSize": 100}
            ],
            "Edges": [
                {"EdgeType": "SingleLink", "SrcNodeID": 0, "DstNodeID": 1, "Bandwidth": 1.0, "BaseLatency": 0.0}
            ]
        }"#;
        let (mut sim, scheduler) = rig(JSON);

        let busy = Task::new(1, "busy", 40, 1.0, 1.0, 1000.0, "n1");
        scheduler.borrow_mut().submit(busy, "n1").unwrap();

        let head = Task::new(2, "head", 5, 1.0, 1.0, 5.0, "n1");
        scheduler.borrow_mut().submit(head, "n1").unwrap();

        let behind = Task::new(3, "behind", 5, 1.0, 1.0, 1000.0, "n1");
        scheduler.borrow_mut().submit(behind, "n1").unwrap();
        assert_eq!(scheduler.borrow().active_count(), 3);

        sim.step_until_no_events();

        assert_eq!(scheduler.borrow().active_count(), 0, "no task should be left stranded in the active set");
        assert_eq!(scheduler.borrow().processed_count(), 3);

        match &scheduler.borrow().logger.task_info()[&2u64] {
            crate::logger::TaskRecord::Failed { kind, .. } => {
                assert_eq!(*kind, KernelError::Timeout(2, "n1".to_owned()));
            }
            other => panic!("expected head task to time out, got {other:?}"),
        }
        assert!(matches!(
            scheduler.borrow().logger.task_info()[&3u64],
            crate::logger::TaskRecord::Done { .. }
        ));
    }

    #[test]
    fn direct_same_node_submission_skips_transmission() {
        let (mut sim, scheduler) = rig(TWO_NODE_JSON);
        let t = Task::new(1, "t", 1_000_000, 1.0, 1_000_000.0, 1000.0, "n1");
        scheduler.borrow_mut().submit(t, "n1").unwrap();

        sim.step_until_no_events();

        match &scheduler.borrow().logger.task_info()[&1u64] {
            crate::logger::TaskRecord::Done { timings, .. } => {
                assert_eq!(timings[0], 0.0, "direct submission has zero transmission time");
            }
            other => panic!("expected Done, got {other:?}"),
        }
    }
}
