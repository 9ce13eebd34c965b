//! Minimal single-threaded discrete-event kernel.
//!
//! Components register a [`context::SimulationContext`] (and, if they want to receive events, an
//! [`handler::EventHandler`]) with a [`simulation::Simulation`], then schedule events on
//! themselves or each other. Stepping the simulation is the only thing that advances virtual
//! time; there is no async runtime and no OS thread involved.

pub mod component;
pub mod context;
pub mod event;
pub mod handler;
pub mod log;
pub mod simulation;
mod state;

pub use colored;
pub use component::Id;
pub use context::SimulationContext;
pub use event::Event;
pub use handler::EventHandler;
pub use simulation::Simulation;
