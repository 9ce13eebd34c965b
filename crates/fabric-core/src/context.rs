//! Per-component handle onto the simulation.

use std::cell::RefCell;
use std::rc::Rc;

use crate::component::Id;
use crate::event::EventData;
use crate::state::SimulationState;

/// Handle a component uses to read the clock, generate randomness, and schedule events.
///
/// Cloning the underlying `Rc<RefCell<SimulationState>>` instead of owning the state directly is
/// what lets every component (and every task bookkeeping structure owned by
/// `fabric-sim::Scheduler`) hold its own context while they all drive the same clock.
pub struct SimulationContext {
    id: Id,
    name: String,
    sim_state: Rc<RefCell<SimulationState>>,
}

impl SimulationContext {
    pub(crate) fn new(id: Id, name: &str, sim_state: Rc<RefCell<SimulationState>>) -> Self {
        Self {
            id,
            name: name.to_owned(),
            sim_state,
        }
    }

    /// Returns the component's id.
    pub fn id(&self) -> Id {
        self.id
    }

    /// Returns the component's registered name, used as the logging target.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the current virtual time.
    pub fn time(&self) -> f64 {
        self.sim_state.borrow().time()
    }

    /// Draws a uniform sample in `[0, 1)` from the simulation's seeded RNG.
    pub fn rand(&self) -> f64 {
        self.sim_state.borrow_mut().rand()
    }

    /// Draws a uniform sample from `range` using the simulation's seeded RNG.
    pub fn gen_range<T, R>(&self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.sim_state.borrow_mut().gen_range(range)
    }

    /// Schedules `data` for delivery to `dest` after `delay` virtual seconds.
    pub fn emit<T>(&self, data: T, dest: Id, delay: f64) -> u64
    where
        T: EventData,
    {
        self.sim_state.borrow_mut().add_event(data, self.id, dest, delay)
    }

    /// Schedules `data` for immediate delivery to `dest` (delay 0).
    pub fn emit_now<T>(&self, data: T, dest: Id) -> u64
    where
        T: EventData,
    {
        self.sim_state.borrow_mut().add_event(data, self.id, dest, 0.)
    }

    /// Schedules `data` for delivery back to this component after `delay` virtual seconds.
    pub fn emit_self<T>(&self, data: T, delay: f64) -> u64
    where
        T: EventData,
    {
        self.sim_state.borrow_mut().add_event(data, self.id, self.id, delay)
    }

    /// Schedules `data` for immediate delivery back to this component.
    pub fn emit_self_now<T>(&self, data: T) -> u64
    where
        T: EventData,
    {
        self.sim_state.borrow_mut().add_event(data, self.id, self.id, 0.)
    }

    /// Cancels a previously scheduled event by id. A no-op if it already fired.
    pub fn cancel_event(&self, event_id: u64) {
        self.sim_state.borrow_mut().cancel_event(event_id);
    }
}
