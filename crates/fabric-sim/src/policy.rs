//! Destination-selection capability (C10).
//!
//! A `Policy` is a trait object, not a base class in an inheritance hierarchy — the same seam
//! the upstream's pluggable (including RL-based) schedulers plug into, minus the RL training
//! harness, which is this crate's explicit non-goal.

use std::cell::Cell;

use rand::prelude::*;
use rand_pcg::Pcg64;

use crate::task::Task;

/// A read-only snapshot of every node's CPU capacity, mirroring [`crate::env::Env::status`]
/// with no argument.
#[derive(Debug, Clone, Default)]
pub struct WholeStatus {
    pub node_names: Vec<String>,
    pub node_max_cpu_hz: Vec<f64>,
    pub node_free_cpu_hz: Vec<f64>,
}

/// The narrow, read-only capability a [`Policy`] is given over kernel state. A policy can never
/// mutate the kernel directly — the only way it affects the simulation is the destination name
/// it returns from [`Policy::decide`], which the caller then feeds to `Env::submit`.
pub trait PolicyView {
    fn whole_status(&mut self) -> WholeStatus;

    /// Whether `dst` can be reached from `src` within `budget` virtual seconds of latency.
    fn reachable_within(&mut self, src: &str, dst: &str, budget: f64) -> bool;
}

/// Chooses a destination node name for `task`.
pub trait Policy {
    fn decide(&self, view: &mut dyn PolicyView, task: &Task) -> String;
}

/// Picks uniformly at random among every known node.
pub struct RandomPolicy {
    rng: std::cell::RefCell<Pcg64>,
}

impl RandomPolicy {
    pub fn new(seed: u64) -> Self {
        Self { rng: std::cell::RefCell::new(Pcg64::seed_from_u64(seed)) }
    }
}

impl Policy for RandomPolicy {
    fn decide(&self, view: &mut dyn PolicyView, _task: &Task) -> String {
        let status = view.whole_status();
        let idx = self.rng.borrow_mut().gen_range(0..status.node_names.len());
        status.node_names[idx].clone()
    }
}

/// Cycles through every known node name in a fixed order.
pub struct RoundRobinPolicy {
    next: Cell<usize>,
}

impl RoundRobinPolicy {
    pub fn new() -> Self {
        Self { next: Cell::new(0) }
    }
}

impl Default for RoundRobinPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl Policy for RoundRobinPolicy {
    fn decide(&self, view: &mut dyn PolicyView, _task: &Task) -> String {
        let status = view.whole_status();
        let idx = self.next.get() % status.node_names.len();
        self.next.set(idx + 1);
        status.node_names[idx].clone()
    }
}

/// Picks the node with the most free CPU among those reachable within the task's deadline
/// budget; ties break on lowest node name.
pub struct GreedyPolicy;

impl Policy for GreedyPolicy {
    fn decide(&self, view: &mut dyn PolicyView, task: &Task) -> String {
        let status = view.whole_status();
        let mut best: Option<(usize, f64)> = None;
        for (idx, name) in status.node_names.iter().enumerate() {
            if !view.reachable_within(&task.src_name, name, task.deadline) {
                continue;
            }
            let free = status.node_free_cpu_hz[idx];
            let better = match best {
                Some((best_idx, best_free)) => {
                    free > best_free || (free == best_free && name < &status.node_names[best_idx])
                }
                None => true,
            };
            if better {
                best = Some((idx, free));
            }
        }
        best.map(|(idx, _)| status.node_names[idx].clone()).unwrap_or_else(|| task.src_name.clone())
    }
}
