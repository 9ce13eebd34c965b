//! Per-task execution energy accounting models.

use serde::{Deserialize, Serialize};

/// How a task's execution energy is derived from the CPU it occupied.
///
/// Resolves an open question left by the upstream model (§9): `Linear` is the default, `Cubic`
/// is offered for callers who want the more aggressive accounting the original implementation
/// favored for some workloads.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EnergyModel {
    Linear,
    Cubic,
}

impl Default for EnergyModel {
    fn default() -> Self {
        EnergyModel::Linear
    }
}

impl EnergyModel {
    /// `busy_cpu_hz` is `max_cpu_hz - free_cpu_hz` at the instant the task was admitted, which
    /// under the single-task-CPU rule equals `max_cpu_hz` for the task's whole execution.
    pub fn exec_energy(&self, exe_coefficient: f64, busy_cpu_hz: f64, exec_time: f64) -> f64 {
        match self {
            EnergyModel::Linear => exe_coefficient * busy_cpu_hz * exec_time,
            EnergyModel::Cubic => exe_coefficient * busy_cpu_hz.powi(3) * exec_time,
        }
    }
}
