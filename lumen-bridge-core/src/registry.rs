use lumen_bridge_error::{LbError, LbResult};
use lumen_bridge_models::ChannelMapping;
use std::collections::HashMap;

/// Immutable lookup from channel number to its three outbound topics.
///
/// Built once from validated configuration; concurrent reads need no
/// synchronization.
#[derive(Debug)]
pub struct ChannelRegistry {
    mappings: HashMap<i32, ChannelMapping>,
}

impl ChannelRegistry {
    /// Build the registry from the configured mapping list.
    ///
    /// Duplicate channel numbers are rejected rather than resolved
    /// last-wins, so a misconfigured file fails at startup instead of
    /// silently dropping topics.
    pub fn from_mappings(mappings: Vec<ChannelMapping>) -> LbResult<Self> {
        let mut map = HashMap::with_capacity(mappings.len());
        for mapping in mappings {
            if map.insert(mapping.channel, mapping.clone()).is_some() {
                return Err(LbError::InvalidSettings(format!(
                    "duplicate channel mapping for channel {}",
                    mapping.channel
                )));
            }
        }
        Ok(Self { mappings: map })
    }

    /// Resolve a channel number to its topic mapping.
    #[inline]
    pub fn lookup(&self, channel: i32) -> Option<&ChannelMapping> {
        self.mappings.get(&channel)
    }

    /// Number of configured channels.
    #[inline]
    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}
