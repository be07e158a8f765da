use crate::northward::Publisher;
use crate::registry::ChannelRegistry;
use crate::state::ChannelStateStore;
use chrono::{DateTime, Utc};
use lumen_bridge_error::process::PointError;
use lumen_bridge_models::DataPoint;
use std::sync::Arc;
use tracing::debug;

/// On/off payload published when a channel receives data.
///
/// Policy: the on/off sub-signal latches to "1" on a channel's first
/// accepted data point and is never driven back to "0" by the bridge;
/// powering a channel off happens out of band.
const ON: &str = "1";

/// Render an intensity value as the fixed-precision wire payload.
///
/// Six fractional digits, always, so downstream consumers can compare
/// payloads as strings.
#[inline]
pub fn format_intensity(value: f64) -> String {
    format!("{value:.6}")
}

/// Result of pushing one data point through the engine.
#[derive(Debug)]
pub enum PointOutcome {
    /// The point passed validation and the freshness check. `published`
    /// counts sub-signal publishes that succeeded; failures are collected
    /// without aborting the remaining sub-signals.
    Accepted {
        published: usize,
        publish_errors: Vec<String>,
        snapshot: ChannelSnapshot,
    },
    /// The point carried a request timestamp older than the channel's last
    /// accepted update. Not an error; no publishes, no state change.
    Discarded,
    /// The point failed validation before touching channel state.
    Rejected(PointError),
}

/// Accepted values of a point, for state logging after processing.
#[derive(Debug, Clone)]
pub struct ChannelSnapshot {
    pub channel: i32,
    pub intensity: f64,
    pub color: String,
}

/// Stateful deduplication and ordering engine.
///
/// For each accepted data point the engine publishes only the sub-signals
/// whose values differ from the channel's stored state, under that channel's
/// exclusive lock. Stored values advance only on confirmed publish success,
/// so a failed sub-signal is retried when the same value arrives again.
pub struct DedupEngine {
    registry: Arc<ChannelRegistry>,
    store: Arc<ChannelStateStore>,
    publisher: Arc<dyn Publisher>,
}

impl DedupEngine {
    pub fn new(
        registry: Arc<ChannelRegistry>,
        store: Arc<ChannelStateStore>,
        publisher: Arc<dyn Publisher>,
    ) -> Self {
        Self {
            registry,
            store,
            publisher,
        }
    }

    /// Process one data point against the channel's stored state.
    ///
    /// `request_ts` is shared by all points of the same request; the
    /// freshness check compares it against the channel's last accepted
    /// update and silently discards out-of-order points.
    pub async fn apply(&self, request_ts: DateTime<Utc>, point: &DataPoint) -> PointOutcome {
        let channel = point.channel_number;

        let Some(mapping) = self.registry.lookup(channel) else {
            return PointOutcome::Rejected(PointError::UnmappedChannel(channel));
        };

        let value = match point.finite_value() {
            Ok(v) => v,
            Err(reason) => {
                return PointOutcome::Rejected(PointError::InvalidValue { channel, reason })
            }
        };

        // Everything below happens under this channel's exclusive section.
        let handle = self.store.entry(channel);
        let mut state = handle.lock().await;

        if let Some(last) = state.last_update {
            if request_ts < last {
                debug!(
                    channel,
                    request_ts = %request_ts,
                    last_update = %last,
                    "discarding out-of-order data point"
                );
                return PointOutcome::Discarded;
            }
        }

        let mut published = 0usize;
        let mut publish_errors = Vec::new();

        // On/off sub-signal.
        if state.last_on_off != Some(ON) {
            match self.publisher.publish(&mapping.on_off_topic, ON).await {
                Ok(()) => {
                    debug!(channel, topic = %mapping.on_off_topic, "on/off state set to '1'");
                    state.last_on_off = Some(ON);
                    published += 1;
                }
                Err(e) => publish_errors.push(format!(
                    "failed to publish on/off state to '{}' for channel {}: {}",
                    mapping.on_off_topic, channel, e
                )),
            }
        }

        // Intensity sub-signal.
        if state.last_intensity != Some(value) {
            let payload = format_intensity(value);
            match self.publisher.publish(&mapping.intensity_topic, &payload).await {
                Ok(()) => {
                    debug!(
                        channel,
                        topic = %mapping.intensity_topic,
                        payload = %payload,
                        "intensity changed"
                    );
                    state.last_intensity = Some(value);
                    published += 1;
                }
                Err(e) => publish_errors.push(format!(
                    "failed to publish intensity to '{}' for channel {}: {}",
                    mapping.intensity_topic, channel, e
                )),
            }
        }

        // Color sub-signal.
        if state.last_color.as_deref() != Some(point.color.as_str()) {
            match self.publisher.publish(&mapping.color_topic, &point.color).await {
                Ok(()) => {
                    debug!(
                        channel,
                        topic = %mapping.color_topic,
                        color = %point.color,
                        "color changed"
                    );
                    state.last_color = Some(point.color.clone());
                    published += 1;
                }
                Err(e) => publish_errors.push(format!(
                    "failed to publish color to '{}' for channel {}: {}",
                    mapping.color_topic, channel, e
                )),
            }
        }

        // Any non-discarded point moves the channel's timeline forward, even
        // when every sub-signal matched the stored state.
        state.last_update = Some(request_ts);

        if published == 0 && publish_errors.is_empty() {
            debug!(channel, "no sub-signal changed, nothing published");
        }

        PointOutcome::Accepted {
            published,
            publish_errors,
            snapshot: ChannelSnapshot {
                channel,
                intensity: value,
                color: point.color.clone(),
            },
        }
    }
}
