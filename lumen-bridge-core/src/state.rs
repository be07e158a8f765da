use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Last-observed values for one channel's three sub-signals.
///
/// Every field starts unset so "never published" stays distinguishable from
/// "published zero/empty". `last_update` carries the timestamp of the request
/// that last updated the channel, not the wall-clock time of the write.
#[derive(Debug, Default)]
pub struct ChannelState {
    pub last_intensity: Option<f64>,
    pub last_color: Option<String>,
    pub last_on_off: Option<&'static str>,
    pub last_update: Option<DateTime<Utc>>,
}

/// Handle to one channel's state, locked for the duration of a data point's
/// read-compare-write sequence.
pub type StateHandle = Arc<Mutex<ChannelState>>;

/// Concurrently-accessed table of per-channel state.
///
/// Each channel has its own async mutex; the map's shard lock is only held
/// for lookup or insertion, so work on one channel never blocks another.
#[derive(Debug, Default)]
pub struct ChannelStateStore {
    channels: DashMap<i32, StateHandle>,
}

impl ChannelStateStore {
    pub fn new() -> Self {
        Self {
            channels: DashMap::new(),
        }
    }

    /// Fetch the state handle for a channel, creating a zero-value entry on
    /// first use.
    pub fn entry(&self, channel: i32) -> StateHandle {
        self.channels
            .entry(channel)
            .or_insert_with(|| Arc::new(Mutex::new(ChannelState::default())))
            .value()
            .clone()
    }

    /// Whether a state entry exists for the channel.
    ///
    /// An entry exists iff at least one valid data point for the channel has
    /// been processed.
    pub fn contains(&self, channel: i32) -> bool {
        self.channels.contains_key(&channel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_entry_created_lazily() {
        let store = ChannelStateStore::new();
        assert!(!store.contains(1));

        let handle = store.entry(1);
        assert!(store.contains(1));

        let state = handle.lock().await;
        assert!(state.last_intensity.is_none());
        assert!(state.last_color.is_none());
        assert!(state.last_on_off.is_none());
        assert!(state.last_update.is_none());
    }

    #[tokio::test]
    async fn test_entry_returns_same_state() {
        let store = ChannelStateStore::new();
        {
            let handle = store.entry(5);
            handle.lock().await.last_intensity = Some(1.0);
        }

        let handle = store.entry(5);
        assert_eq!(handle.lock().await.last_intensity, Some(1.0));
    }
}
