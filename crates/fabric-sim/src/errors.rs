//! Error taxonomy for the scheduler kernel and its config/trace boundary.

use thiserror::Error;

/// The kernel's closed error taxonomy (§7). Every failure a task can experience is one of these;
/// a `Policy`, CLI or logger that sees anything else has found a kernel bug.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum KernelError {
    #[error("task id {0} is already active")]
    DuplicateTaskId(u64),

    #[error("no path from `{0}` to `{1}`")]
    NoPath(String, String),

    #[error("wireless node `{0}` has no wired anchor")]
    IsolatedWireless(String),

    #[error("insufficient bandwidth on the path from `{0}` to `{1}`")]
    NetCongestion(String, String),

    #[error("node `{0}` has no room in its buffer for task {1}")]
    InsufficientBuffer(String, u64),

    #[error("task {0} timed out waiting in `{1}`'s buffer")]
    Timeout(u64, String),

    #[error("`{0}` not found")]
    NotFound(String),
}

/// The error `Env::submit` can return synchronously (§4.4, §6.4). A `Timeout` cannot appear here:
/// it is only discovered later, at reactivation, and is reported through `done_task_info`/the
/// logger instead.
pub type SubmitError = KernelError;

/// Failures at the config/trace-file boundary (§4.9). Never reaches a `Policy`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("node ids must be dense and start at 0")]
    NonDenseNodeIds,

    #[error("unknown edge type `{0}`")]
    UnknownEdgeType(String),

    #[error("cannot compute base latency between `{0}` and `{1}`: missing location")]
    MissingLocationForLatency(String, String),
}
