//! The event loop driving virtual time.

use std::cell::RefCell;
use std::rc::Rc;

use log::Level::Trace;
use log::{debug, log_enabled, trace};
use serde_json::json;
use serde_type_name::type_name;

use crate::component::Id;
use crate::context::SimulationContext;
use crate::handler::EventHandler;
use crate::log::log_undelivered_event;
use crate::state::SimulationState;

/// Owns the virtual clock, the event heap and every registered component's handler.
///
/// Stepping the simulation is the *only* way virtual time advances; nothing else in this crate
/// or its dependents is allowed to observe wall-clock time or spawn an OS thread.
pub struct Simulation {
    sim_state: Rc<RefCell<SimulationState>>,
    handlers: Vec<Option<Rc<RefCell<dyn EventHandler>>>>,
}

impl Simulation {
    /// Creates a new simulation seeded for a deterministic RNG stream.
    pub fn new(seed: u64) -> Self {
        Self {
            sim_state: Rc::new(RefCell::new(SimulationState::new(seed))),
            handlers: Vec::new(),
        }
    }

    fn register(&mut self, name: &str) -> Id {
        let id = self.sim_state.borrow_mut().register(name);
        if id as usize == self.handlers.len() {
            self.handlers.push(None);
        }
        id
    }

    /// Looks up a component's name by id.
    pub fn lookup_name(&self, id: Id) -> String {
        self.sim_state.borrow().lookup_name(id).to_owned()
    }

    /// Registers a new component (without a handler) and returns a context for it.
    pub fn create_context<S>(&mut self, name: S) -> SimulationContext
    where
        S: AsRef<str>,
    {
        let id = self.register(name.as_ref());
        let ctx = SimulationContext::new(id, name.as_ref(), self.sim_state.clone());
        debug!(
            target: "kernel",
            "[{:.3} DEBUG kernel] created context: {}",
            self.time(), json!({"name": name.as_ref(), "id": id})
        );
        ctx
    }

    /// Registers `handler` as the recipient of events addressed to `name`.
    pub fn add_handler<S>(&mut self, name: S, handler: Rc<RefCell<dyn EventHandler>>) -> Id
    where
        S: AsRef<str>,
    {
        let id = self.register(name.as_ref());
        self.handlers[id as usize] = Some(handler);
        debug!(
            target: "kernel",
            "[{:.3} DEBUG kernel] added handler: {}",
            self.time(), json!({"name": name.as_ref(), "id": id})
        );
        id
    }

    /// Returns the current virtual time.
    pub fn time(&self) -> f64 {
        self.sim_state.borrow().time()
    }

    /// Pops and dispatches the single next-scheduled event. Returns `false` if the queue is empty.
    pub fn step(&mut self) -> bool {
        let next = self.sim_state.borrow_mut().next_event();
        let Some(event) = next else { return false };
        if log_enabled!(Trace) {
            let src_name = self.lookup_name(event.src);
            let dest_name = self.lookup_name(event.dest);
            trace!(
                target: &dest_name,
                "[{:.3} {} {}] {}",
                event.time,
                crate::log::get_colored("EVENT", colored::Color::BrightBlack),
                dest_name,
                json!({"type": type_name(&event.data).unwrap(), "data": event.data, "src": src_name})
            );
        }
        match self.handlers.get(event.dest as usize) {
            Some(Some(handler)) => handler.clone().borrow_mut().on(event),
            _ => log_undelivered_event(event),
        }
        true
    }

    /// Dispatches up to `step_count` events, stopping early if the queue empties.
    pub fn steps(&mut self, step_count: u64) -> bool {
        for _ in 0..step_count {
            if !self.step() {
                return false;
            }
        }
        true
    }

    /// Dispatches events until none remain.
    pub fn step_until_no_events(&mut self) {
        while self.step() {}
    }

    /// Advances the clock by `duration`, dispatching every event scheduled within that window.
    pub fn step_for_duration(&mut self, duration: f64) {
        let end_time = self.sim_state.borrow().time() + duration;
        loop {
            let keep_going = match self.sim_state.borrow_mut().peek_event() {
                Some(event) => event.time.into_inner() <= end_time,
                None => false,
            };
            if !keep_going || !self.step() {
                break;
            }
        }
    }

    /// Returns the total number of events ever scheduled.
    pub fn event_count(&self) -> u64 {
        self.sim_state.borrow().event_count()
    }
}
