//! Northward publishing: the `Publisher` seam the engine talks to, plus the
//! MQTT implementation and its connection supervisor.

mod mqtt;
mod publisher;
mod supervisor;

pub use publisher::MqttPublisher;

use async_trait::async_trait;
use backoff::ExponentialBackoff;
use lumen_bridge_error::publish::PublishError;
use lumen_bridge_error::PublishResult;
use lumen_bridge_models::settings::RetryPolicy;
use std::time::Duration;
use tokio::sync::watch;

/// Seam between the engine and the messaging backend.
///
/// Payloads are opaque strings; the engine pre-formats numeric payloads.
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, topic: &str, payload: &str) -> PublishResult<()>;
}

/// Broker connection state broadcast by the supervisor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    /// Retries exhausted; the supervisor has given up.
    Failed(String),
}

/// Block until the supervisor reports a connected broker.
///
/// Used by the wait-connected start policy; returns an error when the
/// supervisor fails permanently or the timeout elapses first.
pub async fn wait_connected(
    rx: &mut watch::Receiver<ConnectionState>,
    timeout: Duration,
) -> PublishResult<()> {
    let wait = async {
        loop {
            let current = rx.borrow().clone();
            match current {
                ConnectionState::Connected => return Ok(()),
                ConnectionState::Failed(msg) => return Err(PublishError::Client(msg)),
                _ => {}
            }
            if rx.changed().await.is_err() {
                return Err(PublishError::NotConnected);
            }
        }
    };

    tokio::time::timeout(timeout, wait)
        .await
        .map_err(|_| PublishError::Timeout(timeout))?
}

/// Map the configured numeric QoS level to the client type.
pub(crate) fn qos_from(level: u8) -> rumqttc::QoS {
    match level {
        0 => rumqttc::QoS::AtMostOnce,
        1 => rumqttc::QoS::AtLeastOnce,
        2 => rumqttc::QoS::ExactlyOnce,
        _ => rumqttc::QoS::AtMostOnce,
    }
}

/// Build an `ExponentialBackoff` from the reconnect policy.
///
/// `max_elapsed_time` stays unset; the supervisor enforces the attempt cap
/// itself.
pub(crate) fn build_exponential_backoff(policy: &RetryPolicy) -> ExponentialBackoff {
    ExponentialBackoff {
        initial_interval: Duration::from_millis(policy.initial_interval_ms.max(1)),
        max_interval: Duration::from_millis(policy.max_interval_ms.max(policy.initial_interval_ms)),
        randomization_factor: policy.randomization_factor.clamp(0.0, 1.0),
        multiplier: policy.multiplier.max(1.0),
        max_elapsed_time: None,
        ..ExponentialBackoff::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qos_mapping() {
        assert_eq!(qos_from(0), rumqttc::QoS::AtMostOnce);
        assert_eq!(qos_from(1), rumqttc::QoS::AtLeastOnce);
        assert_eq!(qos_from(2), rumqttc::QoS::ExactlyOnce);
        assert_eq!(qos_from(9), rumqttc::QoS::AtMostOnce);
    }
}
