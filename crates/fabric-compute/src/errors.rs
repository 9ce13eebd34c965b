//! Errors raised by [`crate::node::Node`].

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NodeError {
    #[error("node has no free CPU")]
    NoFreeCpu,

    #[error("buffer has insufficient free space")]
    BufferFull,
}
