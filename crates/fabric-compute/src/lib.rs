//! Compute nodes: single-task CPU, bounded task buffer, energy accounting.

pub mod buffer;
pub mod energy;
pub mod errors;
pub mod node;

pub use buffer::{Buffer, BufferedItem};
pub use energy::EnergyModel;
pub use errors::NodeError;
pub use node::{BufferStatus, CpuStatus, EnergyCoefficients, Node};
