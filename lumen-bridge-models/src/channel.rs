use serde::{Deserialize, Serialize};

/// Mapping from a logical channel number to its three outbound MQTT topics.
///
/// Built once from configuration and never mutated afterwards. Channel
/// numbers must be unique across the configured list; the registry rejects
/// duplicates at startup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChannelMapping {
    /// Logical channel number as sent by the client.
    pub channel: i32,
    /// Topic receiving the fixed-precision intensity payload.
    pub intensity_topic: String,
    /// Topic receiving the raw color payload.
    pub color_topic: String,
    /// Topic receiving the on/off payload ("0"/"1" domain).
    pub on_off_topic: String,
}
