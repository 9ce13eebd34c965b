use std::collections::{BinaryHeap, HashMap, HashSet};

use decorum::R64;
use rand::distributions::uniform::{SampleRange, SampleUniform};
use rand::prelude::*;
use rand_pcg::Pcg64;

use crate::component::Id;
use crate::event::{Event, EventData};
use crate::log::log_incorrect_event;

pub struct SimulationState {
    clock: R64,
    rand: Pcg64,
    events: BinaryHeap<Event>,
    canceled_events: HashSet<u64>,
    event_count: u64,
    name_to_id: HashMap<String, Id>,
    names: Vec<String>,
}

impl SimulationState {
    pub fn new(seed: u64) -> Self {
        Self {
            clock: R64::from_inner(0.0),
            rand: Pcg64::seed_from_u64(seed),
            events: BinaryHeap::new(),
            canceled_events: HashSet::new(),
            event_count: 0,
            name_to_id: HashMap::new(),
            names: Vec::new(),
        }
    }

    pub fn register(&mut self, name: &str) -> Id {
        if let Some(&id) = self.name_to_id.get(name) {
            return id;
        }
        let id = self.names.len() as Id;
        self.name_to_id.insert(name.to_owned(), id);
        self.names.push(name.to_owned());
        id
    }

    pub fn lookup_name(&self, id: Id) -> &str {
        &self.names[id as usize]
    }

    pub fn time(&self) -> f64 {
        self.clock.into_inner()
    }

    pub fn rand(&mut self) -> f64 {
        self.rand.gen_range(0.0..1.0)
    }

    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: SampleUniform,
        R: SampleRange<T>,
    {
        self.rand.gen_range(range)
    }

    pub fn add_event<T>(&mut self, data: T, src: Id, dest: Id, delay: f64) -> u64
    where
        T: EventData,
    {
        let event_id = self.event_count;
        let event = Event {
            id: event_id,
            time: self.clock + delay.max(0.),
            src,
            dest,
            data: Box::new(data),
        };
        if delay >= 0. {
            self.events.push(event);
            self.event_count += 1;
            event_id
        } else {
            log_incorrect_event(event, &format!("negative delay {}", delay));
            panic!("event delay is negative! it is not allowed to add events from the past");
        }
    }

    pub fn next_event(&mut self) -> Option<Event> {
        loop {
            let event = self.events.pop()?;
            if !self.canceled_events.remove(&event.id) {
                self.clock = event.time;
                return Some(event);
            }
        }
    }

    pub fn peek_event(&mut self) -> Option<&Event> {
        loop {
            let id = self.events.peek()?.id;
            if self.canceled_events.remove(&id) {
                self.events.pop();
            } else {
                return self.events.peek();
            }
        }
    }

    pub fn cancel_event(&mut self, event_id: u64) {
        self.canceled_events.insert(event_id);
    }

    pub fn event_count(&self) -> u64 {
        self.event_count
    }
}
