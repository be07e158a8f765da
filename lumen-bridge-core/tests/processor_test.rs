use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use lumen_bridge_core::{BatchProcessor, ChannelRegistry, ChannelStateStore, Publisher};
use lumen_bridge_error::process::ProcessError;
use lumen_bridge_error::publish::PublishError;
use lumen_bridge_error::PublishResult;
use lumen_bridge_models::{ChannelMapping, DataPoint};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Publisher double recording every accepted (topic, payload) pair, with
/// per-topic failure injection.
#[derive(Default)]
struct MockPublisher {
    messages: Mutex<Vec<(String, String)>>,
    fail_topics: Mutex<HashSet<String>>,
}

impl MockPublisher {
    fn fail_topic(&self, topic: &str) {
        self.fail_topics.lock().unwrap().insert(topic.to_string());
    }

    fn heal_topic(&self, topic: &str) {
        self.fail_topics.lock().unwrap().remove(topic);
    }

    fn published(&self, topic: &str) -> Vec<String> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .filter(|(t, _)| t == topic)
            .map(|(_, p)| p.clone())
            .collect()
    }

    fn total(&self) -> usize {
        self.messages.lock().unwrap().len()
    }

    fn clear(&self) {
        self.messages.lock().unwrap().clear();
    }
}

#[async_trait]
impl Publisher for MockPublisher {
    async fn publish(&self, topic: &str, payload: &str) -> PublishResult<()> {
        if self.fail_topics.lock().unwrap().contains(topic) {
            return Err(PublishError::Client("injected failure".into()));
        }
        self.messages
            .lock()
            .unwrap()
            .push((topic.to_string(), payload.to_string()));
        Ok(())
    }
}

fn mapping(channel: i32) -> ChannelMapping {
    ChannelMapping {
        channel,
        intensity_topic: format!("ch{channel}/intensity"),
        color_topic: format!("ch{channel}/color"),
        on_off_topic: format!("ch{channel}/onoff"),
    }
}

fn point(channel: i32, value: f64, color: &str) -> DataPoint {
    serde_json::from_value(serde_json::json!({
        "channelNumber": channel,
        "value": value,
        "color": color,
    }))
    .expect("build data point")
}

fn ts(seconds: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + seconds, 0).unwrap()
}

struct Fixture {
    processor: BatchProcessor,
    store: Arc<ChannelStateStore>,
    publisher: Arc<MockPublisher>,
}

fn fixture(channels: &[i32]) -> Fixture {
    let registry = Arc::new(
        ChannelRegistry::from_mappings(channels.iter().map(|c| mapping(*c)).collect()).unwrap(),
    );
    let store = Arc::new(ChannelStateStore::new());
    let publisher = Arc::new(MockPublisher::default());
    let processor = BatchProcessor::new(
        registry,
        Arc::clone(&store),
        Arc::clone(&publisher) as Arc<dyn Publisher>,
    );
    Fixture {
        processor,
        store,
        publisher,
    }
}

#[tokio::test]
async fn test_first_point_publishes_all_three_topics() {
    let f = fixture(&[1]);

    let report = f
        .processor
        .process(ts(0), &[point(1, 10.5, "#FF0000")])
        .await
        .unwrap();

    assert!(report.is_clean());
    assert_eq!(report.processed, 1);
    assert_eq!(f.publisher.total(), 3);
    assert_eq!(f.publisher.published("ch1/onoff"), vec!["1"]);
    assert_eq!(f.publisher.published("ch1/intensity"), vec!["10.500000"]);
    assert_eq!(f.publisher.published("ch1/color"), vec!["#FF0000"]);
}

#[tokio::test]
async fn test_identical_resubmission_publishes_nothing() {
    let f = fixture(&[1]);

    f.processor
        .process(ts(0), &[point(1, 10.5, "#FF0000")])
        .await
        .unwrap();
    f.publisher.clear();

    let report = f
        .processor
        .process(ts(1), &[point(1, 10.5, "#FF0000")])
        .await
        .unwrap();

    assert!(report.is_clean());
    assert_eq!(report.processed, 1);
    assert_eq!(f.publisher.total(), 0);

    // The channel's timeline still advanced.
    let state = f.store.entry(1);
    assert_eq!(state.lock().await.last_update, Some(ts(1)));
}

#[tokio::test]
async fn test_color_only_change_publishes_color_only() {
    let f = fixture(&[1]);

    f.processor
        .process(ts(0), &[point(1, 10.5, "#FF0000")])
        .await
        .unwrap();
    f.publisher.clear();

    let report = f
        .processor
        .process(ts(2), &[point(1, 10.5, "#00FF00")])
        .await
        .unwrap();

    assert!(report.is_clean());
    assert_eq!(f.publisher.total(), 1);
    assert_eq!(f.publisher.published("ch1/color"), vec!["#00FF00"]);
}

#[tokio::test]
async fn test_value_only_change_publishes_intensity_only() {
    let f = fixture(&[1]);

    f.processor
        .process(ts(0), &[point(1, 10.5, "#FF0000")])
        .await
        .unwrap();
    f.publisher.clear();

    let report = f
        .processor
        .process(ts(1), &[point(1, 20.25, "#FF0000")])
        .await
        .unwrap();

    assert!(report.is_clean());
    assert_eq!(f.publisher.total(), 1);
    assert_eq!(f.publisher.published("ch1/intensity"), vec!["20.250000"]);
}

#[tokio::test]
async fn test_out_of_order_point_is_silently_discarded() {
    let f = fixture(&[1]);

    f.processor
        .process(ts(10), &[point(1, 10.5, "#FF0000")])
        .await
        .unwrap();
    f.publisher.clear();

    let report = f
        .processor
        .process(ts(5), &[point(1, 99.0, "#0000FF")])
        .await
        .unwrap();

    // Not an error, not counted, nothing published, state untouched.
    assert!(report.is_clean());
    assert_eq!(report.processed, 0);
    assert_eq!(f.publisher.total(), 0);

    let state = f.store.entry(1);
    let state = state.lock().await;
    assert_eq!(state.last_intensity, Some(10.5));
    assert_eq!(state.last_color.as_deref(), Some("#FF0000"));
    assert_eq!(state.last_update, Some(ts(10)));
}

#[tokio::test]
async fn test_stale_point_between_accepted_updates() {
    let f = fixture(&[1]);

    // t0, then a state-forcing future update, then a point between the two.
    f.processor
        .process(ts(0), &[point(1, 1.0, "#111111")])
        .await
        .unwrap();
    f.processor
        .process(ts(100), &[point(1, 2.0, "#222222")])
        .await
        .unwrap();
    f.publisher.clear();

    let report = f
        .processor
        .process(ts(50), &[point(1, 3.0, "#333333")])
        .await
        .unwrap();

    assert_eq!(report.processed, 0);
    assert_eq!(f.publisher.total(), 0);

    let state = f.store.entry(1);
    let state = state.lock().await;
    assert_eq!(state.last_update, Some(ts(100)));
    assert_eq!(state.last_intensity, Some(2.0));
}

#[tokio::test]
async fn test_unmapped_channel_does_not_abort_batch() {
    let f = fixture(&[1]);

    let report = f
        .processor
        .process(
            ts(0),
            &[point(42, 1.0, "#FFFFFF"), point(1, 10.5, "#FF0000")],
        )
        .await
        .unwrap();

    assert_eq!(report.processed, 1);
    assert_eq!(report.validation_errors.len(), 1);
    assert!(report.validation_errors[0].contains("channelNumber: 42"));
    assert!(report.publish_errors.is_empty());

    // Only the mapped channel published.
    assert_eq!(f.publisher.total(), 3);
    assert_eq!(f.publisher.published("ch1/intensity"), vec!["10.500000"]);

    // No state entry was created for the unmapped channel.
    assert!(!f.store.contains(42));
}

#[tokio::test]
async fn test_non_finite_value_is_a_point_error() {
    let f = fixture(&[1]);

    let huge: DataPoint = serde_json::from_str(
        r##"{"channelNumber": 1, "value": 1e999, "color": "#FF0000"}"##,
    )
    .expect("decode data point");

    let report = f.processor.process(ts(0), &[huge]).await.unwrap();

    assert_eq!(report.processed, 0);
    assert_eq!(report.validation_errors.len(), 1);
    assert!(report.validation_errors[0].contains("invalid value for channelNumber 1"));
    assert_eq!(f.publisher.total(), 0);
    assert!(!f.store.contains(1));
}

#[tokio::test]
async fn test_failed_publish_keeps_state_for_retry() {
    let f = fixture(&[1]);
    f.publisher.fail_topic("ch1/intensity");

    let report = f
        .processor
        .process(ts(0), &[point(1, 10.5, "#FF0000")])
        .await
        .unwrap();

    assert_eq!(report.processed, 1);
    assert_eq!(report.publish_errors.len(), 1);
    assert!(report.publish_errors[0].contains("ch1/intensity"));

    {
        let state = f.store.entry(1);
        let state = state.lock().await;
        // Failed sub-signal did not advance; the others did.
        assert_eq!(state.last_intensity, None);
        assert_eq!(state.last_on_off, Some("1"));
        assert_eq!(state.last_color.as_deref(), Some("#FF0000"));
        assert_eq!(state.last_update, Some(ts(0)));
    }

    // Same value again once the topic recovers: only intensity is retried.
    f.publisher.heal_topic("ch1/intensity");
    f.publisher.clear();

    let report = f
        .processor
        .process(ts(1), &[point(1, 10.5, "#FF0000")])
        .await
        .unwrap();

    assert!(report.is_clean());
    assert_eq!(f.publisher.total(), 1);
    assert_eq!(f.publisher.published("ch1/intensity"), vec!["10.500000"]);
}

#[tokio::test]
async fn test_same_channel_twice_in_one_batch() {
    let f = fixture(&[1]);

    let report = f
        .processor
        .process(
            ts(0),
            &[point(1, 1.0, "#FF0000"), point(1, 2.0, "#FF0000")],
        )
        .await
        .unwrap();

    assert!(report.is_clean());
    assert_eq!(report.processed, 2);

    // Second point re-read the state the first just wrote: on/off and color
    // went out once, intensity twice.
    assert_eq!(f.publisher.published("ch1/onoff"), vec!["1"]);
    assert_eq!(f.publisher.published("ch1/color"), vec!["#FF0000"]);
    assert_eq!(
        f.publisher.published("ch1/intensity"),
        vec!["1.000000", "2.000000"]
    );
}

#[tokio::test]
async fn test_independent_channels_in_one_batch() {
    let f = fixture(&[1, 2]);

    let report = f
        .processor
        .process(
            ts(0),
            &[point(1, 10.5, "#FF0000"), point(2, 20.0, "#00FF00")],
        )
        .await
        .unwrap();

    assert!(report.is_clean());
    assert_eq!(report.processed, 2);
    assert_eq!(f.publisher.total(), 6);
    assert_eq!(f.publisher.published("ch2/intensity"), vec!["20.000000"]);
}

#[tokio::test]
async fn test_empty_batch_is_rejected() {
    let f = fixture(&[1]);

    let err = f.processor.process(ts(0), &[]).await.unwrap_err();
    assert_eq!(err, ProcessError::EmptyBatch);
    assert_eq!(f.publisher.total(), 0);
}

#[tokio::test]
async fn test_on_off_latches_on() {
    let f = fixture(&[1]);

    // Zero and negative intensities still latch the channel on.
    f.processor
        .process(ts(0), &[point(1, 0.0, "#FF0000")])
        .await
        .unwrap();
    assert_eq!(f.publisher.published("ch1/onoff"), vec!["1"]);
    f.publisher.clear();

    f.processor
        .process(ts(1), &[point(1, -1.0, "#FF0000")])
        .await
        .unwrap();

    // Already latched: no further on/off publish, ever.
    assert_eq!(f.publisher.published("ch1/onoff"), Vec::<String>::new());
}
