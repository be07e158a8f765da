use crate::engine::{DedupEngine, PointOutcome};
use crate::northward::Publisher;
use crate::registry::ChannelRegistry;
use crate::state::ChannelStateStore;
use chrono::{DateTime, Utc};
use lumen_bridge_error::process::ProcessError;
use lumen_bridge_models::DataPoint;
use lumen_bridge_utils::color::terminal_swatch;
use std::sync::Arc;
use tracing::{info, warn};

/// Aggregated result of one batch.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Accepted (non-discarded, valid) data points.
    pub processed: usize,
    /// Per-point validation failures, in input order.
    pub validation_errors: Vec<String>,
    /// Per-sub-signal publish failures, in input order.
    pub publish_errors: Vec<String>,
}

impl BatchReport {
    /// True when every point was handled without validation or publish
    /// errors.
    pub fn is_clean(&self) -> bool {
        self.validation_errors.is_empty() && self.publish_errors.is_empty()
    }

    /// All errors in one list, validation first, for the response body.
    pub fn all_errors(&self) -> Vec<String> {
        let mut errors =
            Vec::with_capacity(self.validation_errors.len() + self.publish_errors.len());
        errors.extend(self.validation_errors.iter().cloned());
        errors.extend(self.publish_errors.iter().cloned());
        errors
    }
}

/// Drives a request's data points through the engine, in input order.
///
/// Points are processed sequentially within a request; a later point for the
/// same channel re-reads the state the earlier one just wrote. Requests
/// running concurrently only contend on channels they share.
pub struct BatchProcessor {
    engine: DedupEngine,
}

impl BatchProcessor {
    pub fn new(
        registry: Arc<ChannelRegistry>,
        store: Arc<ChannelStateStore>,
        publisher: Arc<dyn Publisher>,
    ) -> Self {
        Self {
            engine: DedupEngine::new(registry, store, publisher),
        }
    }

    /// Process a batch sharing one request timestamp.
    ///
    /// An empty batch is a request-level error; per-point failures are
    /// collected into the report and never abort sibling points.
    pub async fn process(
        &self,
        request_ts: DateTime<Utc>,
        points: &[DataPoint],
    ) -> Result<BatchReport, ProcessError> {
        if points.is_empty() {
            return Err(ProcessError::EmptyBatch);
        }

        let mut report = BatchReport::default();

        for point in points {
            match self.engine.apply(request_ts, point).await {
                PointOutcome::Accepted {
                    publish_errors,
                    snapshot,
                    ..
                } => {
                    report.processed += 1;
                    report.publish_errors.extend(publish_errors);
                    info!(
                        "CH {:>3} | intensity {:>10.2} | color {} {} | state on | updated {}",
                        snapshot.channel,
                        snapshot.intensity,
                        terminal_swatch(&snapshot.color),
                        snapshot.color,
                        request_ts.to_rfc3339()
                    );
                }
                PointOutcome::Discarded => {}
                PointOutcome::Rejected(err) => {
                    warn!(channel = point.channel_number, error = %err, "data point rejected");
                    report.validation_errors.push(err.to_string());
                }
            }
        }

        if !report.is_clean() {
            warn!(
                processed = report.processed,
                errors = report.validation_errors.len() + report.publish_errors.len(),
                "batch completed with errors"
            );
        }

        Ok(report)
    }
}
