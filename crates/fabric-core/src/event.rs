//! Simulation event.

use std::cmp::Ordering;

use decorum::R64;
use downcast_rs::{impl_downcast, Downcast};
use serde::ser::Serialize;

use crate::component::Id;

/// Marker trait for event payloads.
///
/// Implemented automatically for any `Serialize + 'static` type, mirroring how the teacher's
/// event system lets components pass around arbitrary boxed payloads while still allowing the
/// kernel to log them as JSON and downcast them back inside [`crate::cast!`].
pub trait EventData: Downcast + erased_serde::Serialize {}

impl_downcast!(EventData);

erased_serde::serialize_trait_object!(EventData);

impl<T: Serialize + 'static> EventData for T {}

/// A scheduled event: who sent it, who it's for, when it fires, and its payload.
pub struct Event {
    /// Monotonically increasing id, assigned at scheduling time.
    pub id: u64,
    /// Virtual time at which the event fires.
    pub time: R64,
    /// Id of the component that scheduled the event.
    pub src: Id,
    /// Id of the component the event is delivered to.
    pub dest: Id,
    /// Event payload.
    pub data: Box<dyn EventData>,
}

impl Eq for Event {}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Ord for Event {
    // `events` is a max-heap (`BinaryHeap`); inverting `time` (and then `id` as a tie-break)
    // turns it into a min-heap ordered by (time, id), which is exactly the FIFO-at-equal-time
    // contract the scheduler promises: ids increase monotonically with scheduling order, so two
    // events at the same virtual instant pop in the order they were scheduled.
    fn cmp(&self, other: &Self) -> Ordering {
        other.time.cmp(&self.time).then_with(|| other.id.cmp(&self.id))
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
