//! The network graph: nodes, links, bandwidth reservations and shortest-path queries.
//!
//! A [`Graph`] is a plain, synchronously-queried data structure — unlike an actor-style network
//! model, placing or releasing a [`DataFlow`] takes effect immediately and is driven entirely by
//! the caller (`fabric-sim`'s scheduler), not by events flowing through this crate's own event
//! loop.

pub mod dataflow;
pub mod errors;
pub mod graph;
pub mod link;
pub mod location;
mod routing;

pub use dataflow::DataFlow;
pub use errors::GraphError;
pub use graph::{Graph, Hop, NodeId};
pub use link::{Link, LinkId};
pub use location::Location;
pub use routing::Weight;
