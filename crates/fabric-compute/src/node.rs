//! A compute node: single-task CPU, buffer, energy accounting.

use std::collections::HashSet;

use fabric_net::Location;

use crate::buffer::{Buffer, BufferedItem};
use crate::errors::NodeError;

/// CPU energy coefficients, per §4.5: idle tick cost and per-task execution cost.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnergyCoefficients {
    pub idle: f64,
    pub exe: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CpuStatus {
    pub max_cpu_hz: f64,
    pub free_cpu_hz: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BufferStatus {
    pub max_size: u64,
    pub free_size: u64,
}

/// A node in the infrastructure graph: CPU capacity, a bounded task buffer, optional physical
/// location, and energy accounting.
///
/// The CPU model is single-task: `free_cpu_hz` is always either `0` or `max_cpu_hz`, never a
/// fraction — there is no notion of sharing a core across concurrently running tasks.
pub struct Node<T: BufferedItem> {
    id: u32,
    name: String,
    max_cpu_hz: f64,
    free_cpu_hz: f64,
    buffer: Buffer<T>,
    location: Option<Location>,
    coefficients: EnergyCoefficients,
    energy_consumed: f64,
    active_task_ids: HashSet<u64>,
    total_cpu_hz: f64,
    clock: u64,
    wireless: bool,
}

impl<T: BufferedItem> Node<T> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: u32,
        name: &str,
        max_cpu_hz: f64,
        buffer_capacity_bits: u64,
        location: Option<Location>,
        coefficients: EnergyCoefficients,
        wireless: bool,
    ) -> Self {
        Self {
            id,
            name: name.to_owned(),
            max_cpu_hz,
            free_cpu_hz: max_cpu_hz,
            buffer: Buffer::new(buffer_capacity_bits),
            location,
            coefficients,
            energy_consumed: 0.0,
            active_task_ids: HashSet::new(),
            total_cpu_hz: 0.0,
            clock: 0,
            wireless,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn max_cpu_hz(&self) -> f64 {
        self.max_cpu_hz
    }

    pub fn free_cpu_hz(&self) -> f64 {
        self.free_cpu_hz
    }

    pub fn location(&self) -> Option<Location> {
        self.location
    }

    pub fn is_wireless(&self) -> bool {
        self.wireless
    }

    pub fn energy_consumed(&self) -> f64 {
        self.energy_consumed
    }

    pub fn total_cpu_hz(&self) -> f64 {
        self.total_cpu_hz
    }

    pub fn active_task_count(&self) -> usize {
        self.active_task_ids.len()
    }

    pub fn is_busy(&self) -> bool {
        self.free_cpu_hz == 0.0
    }

    /// Claims the single CPU slot for `task_id`. Fails if the CPU is already held.
    pub fn acquire(&mut self, task_id: u64) -> Result<(), NodeError> {
        if self.free_cpu_hz <= 0.0 {
            return Err(NodeError::NoFreeCpu);
        }
        self.free_cpu_hz = 0.0;
        self.active_task_ids.insert(task_id);
        Ok(())
    }

    /// Releases the CPU slot held by `task_id`, restoring it to fully free.
    pub fn release(&mut self, task_id: u64) {
        assert!(self.free_cpu_hz == 0.0, "release called while CPU was already free");
        self.active_task_ids.remove(&task_id);
        self.free_cpu_hz = self.max_cpu_hz;
    }

    pub fn append_to_buffer(&mut self, item: T) -> Result<(), NodeError> {
        self.buffer.append(item)
    }

    pub fn pop_buffer(&mut self) -> Option<T> {
        self.buffer.pop()
    }

    pub fn buffer_is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn cpu_status(&self) -> CpuStatus {
        CpuStatus { max_cpu_hz: self.max_cpu_hz, free_cpu_hz: self.free_cpu_hz }
    }

    pub fn buffer_status(&self) -> BufferStatus {
        BufferStatus { max_size: self.buffer.max_size(), free_size: self.buffer.free_size() }
    }

    pub fn cpu_utilization(&self) -> f64 {
        1.0 - self.free_cpu_hz / self.max_cpu_hz
    }

    pub fn buffer_utilization(&self) -> f64 {
        if self.buffer.max_size() == 0 {
            0.0
        } else {
            1.0 - self.buffer.free_size() as f64 / self.buffer.max_size() as f64
        }
    }

    /// Runs one energy-tick: a fixed idle draw plus busy-CPU-seconds accrual, per §4.5.
    pub fn tick_idle_energy(&mut self, refresh_rate: f64) {
        self.energy_consumed += self.coefficients.idle * refresh_rate * self.max_cpu_hz;
        self.total_cpu_hz += (self.max_cpu_hz - self.free_cpu_hz) * refresh_rate;
        self.clock += 1;
    }

    /// Credits a task's execution energy, computed by the caller under the configured
    /// [`EnergyModel`](crate::EnergyModel).
    pub fn credit_exec_energy(&mut self, amount: f64) {
        self.energy_consumed += amount;
    }

    pub fn exe_energy_coefficient(&self) -> f64 {
        self.coefficients.exe
    }

    /// Clears buffer, active tasks and counters, restoring the node to its initial state.
    pub fn reset(&mut self) {
        self.buffer.reset();
        self.active_task_ids.clear();
        self.free_cpu_hz = self.max_cpu_hz;
        self.energy_consumed = 0.0;
        self.total_cpu_hz = 0.0;
        self.clock = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Task(u64, u64);
    impl BufferedItem for Task {
        fn id(&self) -> u64 {
            self.0
        }
        fn size_bits(&self) -> u64 {
            self.1
        }
    }

    fn node() -> Node<Task> {
        Node::new(0, "n0", 1000.0, 100, None, EnergyCoefficients { idle: 0.1, exe: 0.5 }, false)
    }

    #[test]
    fn acquire_is_binary_not_fractional() {
        let mut n = node();
        n.acquire(1).unwrap();
        assert_eq!(n.free_cpu_hz(), 0.0);
        assert_eq!(n.acquire(2), Err(NodeError::NoFreeCpu));
        n.release(1);
        assert_eq!(n.free_cpu_hz(), n.max_cpu_hz());
    }

    #[test]
    fn idle_tick_accrues_energy_and_busy_seconds() {
        let mut n = node();
        n.tick_idle_energy(1.0);
        assert_eq!(n.energy_consumed(), 0.1 * 1.0 * 1000.0);
        assert_eq!(n.total_cpu_hz(), 0.0);

        n.acquire(1).unwrap();
        n.tick_idle_energy(1.0);
        assert_eq!(n.total_cpu_hz(), 1000.0);
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut n = node();
        n.acquire(1).unwrap();
        n.append_to_buffer(Task(2, 10)).unwrap();
        n.tick_idle_energy(1.0);
        n.reset();
        assert_eq!(n.free_cpu_hz(), n.max_cpu_hz());
        assert_eq!(n.active_task_count(), 0);
        assert_eq!(n.energy_consumed(), 0.0);
        assert!(n.buffer_is_empty());
    }
}
