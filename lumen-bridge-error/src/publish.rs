use std::time::Duration;
use thiserror::Error;

/// Failures surfaced by the northward publisher.
///
/// A failed publish never advances the stored sub-signal value, so the next
/// submission of the same value retries the publish.
#[derive(Error, Debug, Clone)]
pub enum PublishError {
    #[error("not connected to broker")]
    NotConnected,
    #[error("publish timed out after {} ms", .0.as_millis())]
    Timeout(Duration),
    #[error("{0}")]
    Client(String),
}
