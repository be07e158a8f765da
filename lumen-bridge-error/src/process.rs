use thiserror::Error;

/// Request-level processing failures.
///
/// These abort the whole batch before any data point reaches the engine.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ProcessError {
    #[error("received empty data array")]
    EmptyBatch,
}

/// Per-point validation failures.
///
/// A rejected point is skipped and reported; sibling points in the same
/// batch are unaffected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PointError {
    #[error("no topic mapping found for channelNumber: {0}")]
    UnmappedChannel(i32),
    #[error("invalid value for channelNumber {channel}: {reason}")]
    InvalidValue { channel: i32, reason: String },
}
