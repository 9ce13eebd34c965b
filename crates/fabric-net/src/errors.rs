//! Errors raised by the graph store.

use thiserror::Error;

use crate::link::LinkId;

/// Failure modes for [`crate::graph::Graph`] queries and mutations.
///
/// This is deliberately narrower than the kernel's own error taxonomy: a `Graph` is a plain data
/// structure with no notion of tasks, so it only reports what it can observe directly. Callers in
/// `fabric-sim` map these onto the user-facing `KernelError` (`NotFound`, `NoPath`,
/// `IsolatedWireless`, `NetCongestion`).
#[derive(Debug, Error, PartialEq)]
pub enum GraphError {
    #[error("node `{0}` not found")]
    NodeNotFound(String),

    #[error("link {0} not found")]
    LinkNotFound(LinkId),

    #[error("no path from `{0}` to `{1}`")]
    NoPath(String, String),

    #[error("wireless node `{0}` has no wired anchor")]
    IsolatedWireless(String),

    #[error("link {0} has insufficient free bandwidth")]
    InsufficientBandwidth(LinkId),
}
