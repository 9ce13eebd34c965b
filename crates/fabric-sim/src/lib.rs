//! Discrete-event simulation of task offloading across an edge/fog/cloud compute fabric.
//!
//! [`Env`] is the entry point: build a [`Scenario`] from a config file, wrap it in an `Env`,
//! `submit` tasks (optionally choosing a destination with a [`Policy`]), and `run` the clock.

pub mod config;
pub mod env;
pub mod errors;
pub mod logger;
pub mod policy;
pub mod scenario;
mod scheduler;
pub mod task;

pub use config::{RuntimeConfig, ScenarioConfig, TaskTrace};
pub use env::{Env, EnvOptions, FabricStatus, LinkSnapshot, LinkStatus, NodeStatus};
pub use errors::{ConfigError, KernelError, SubmitError};
pub use logger::{Logger, NodeRecord, TaskRecord};
pub use policy::{GreedyPolicy, Policy, PolicyView, RandomPolicy, RoundRobinPolicy, WholeStatus};
pub use scenario::Scenario;
pub use scheduler::DoneTaskInfo;
pub use task::Task;
