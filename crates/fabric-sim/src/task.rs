//! A task flowing through the scheduler.

use fabric_compute::BufferedItem;
use serde::{Deserialize, Serialize};

/// A task request plus the mutable lifecycle fields the scheduler fills in as it progresses.
///
/// Construction only sets the immutable request attributes (`id`, `size`, `cycles_per_bit`,
/// `trans_bit_rate`, `deadline`, `src_name`); the rest start at a placeholder and are stamped by
/// the scheduler as the task advances through ROUTING/TRANSMITTING/ADMIT/EXECUTING.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub name: String,
    /// Size in bits.
    pub size: u64,
    pub cycles_per_bit: f64,
    /// Transmission bit rate requested for this task's `DataFlow`, in bits/sec.
    pub trans_bit_rate: f64,
    /// Deadline, in virtual seconds, measured from the instant the task is first enqueued.
    pub deadline: f64,
    pub src_name: String,

    /// CPU clock assigned on admission; `-1.0` until then.
    pub cpu_hz: f64,
    pub trans_time: f64,
    /// First stamped with the enqueue instant; rewritten to `elapsed + trans_time` on dequeue.
    pub wait_time: f64,
    pub exec_time: f64,
    pub trans_energy: f64,
    pub exec_energy: f64,
    pub exec_count: u32,
}

impl Task {
    pub fn new(
        id: u64,
        name: &str,
        size: u64,
        cycles_per_bit: f64,
        trans_bit_rate: f64,
        deadline: f64,
        src_name: &str,
    ) -> Self {
        Self {
            id,
            name: name.to_owned(),
            size,
            cycles_per_bit,
            trans_bit_rate,
            deadline,
            src_name: src_name.to_owned(),
            cpu_hz: -1.0,
            trans_time: -1.0,
            wait_time: -1.0,
            exec_time: -1.0,
            trans_energy: 0.0,
            exec_energy: 0.0,
            exec_count: 0,
        }
    }
}

impl BufferedItem for Task {
    fn id(&self) -> u64 {
        self.id
    }

    fn size_bits(&self) -> u64 {
        self.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_leaves_lifecycle_fields_at_their_placeholders() {
        let task = Task::new(7, "t7", 1024, 2.0, 500.0, 10.0, "edge0");
        assert_eq!(task.cpu_hz, -1.0);
        assert_eq!(task.trans_time, -1.0);
        assert_eq!(task.wait_time, -1.0);
        assert_eq!(task.exec_time, -1.0);
        assert_eq!(task.trans_energy, 0.0);
        assert_eq!(task.exec_energy, 0.0);
        assert_eq!(task.exec_count, 0);
    }
}
