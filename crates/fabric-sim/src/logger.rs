//! Append-only sink of per-task and per-node outcomes (C8).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::errors::KernelError;

/// A task's persisted outcome, keyed by task id in [`Logger::task_info`].
///
/// The upstream implementation hands a bare integer flag (trans-done / exec-done / no-CUs)
/// across this exact boundary; an idiomatic port makes the outcome taxonomy a type instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TaskRecord {
    Done {
        route: (String, String),
        /// `[trans_time, wait_time, exec_time]`.
        timings: [f64; 3],
        /// `[trans_energy, exec_energy]`.
        energy: [f64; 2],
    },
    Failed {
        route: (String, String),
        kind: KernelError,
        energy_accrued: f64,
    },
}

/// A node's persisted energy/utilization snapshot, written once on [`Logger::close`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NodeRecord {
    pub energy: f64,
    pub total_cpu_hz: f64,
}

/// Append-only during a run; both maps are cleared by [`Logger::reset`].
#[derive(Debug, Default)]
pub struct Logger {
    task_info: HashMap<u64, TaskRecord>,
    node_info: HashMap<u32, NodeRecord>,
}

impl Logger {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn record_done(&mut self, task_id: u64, route: (String, String), timings: [f64; 3], energy: [f64; 2]) {
        self.task_info.insert(task_id, TaskRecord::Done { route, timings, energy });
    }

    pub fn record_failed(&mut self, task_id: u64, route: (String, String), kind: KernelError, energy_accrued: f64) {
        self.task_info.insert(task_id, TaskRecord::Failed { route, kind, energy_accrued });
    }

    pub fn close_node(&mut self, node_id: u32, energy: f64, total_cpu_hz: f64) {
        self.node_info.insert(node_id, NodeRecord { energy, total_cpu_hz });
    }

    pub fn task_info(&self) -> &HashMap<u64, TaskRecord> {
        &self.task_info
    }

    pub fn node_info(&self) -> &HashMap<u32, NodeRecord> {
        &self.node_info
    }

    pub fn reset(&mut self) {
        self.task_info.clear();
        self.node_info.clear();
    }
}
