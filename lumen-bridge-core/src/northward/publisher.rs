use super::supervisor::{ClientEntry, MqttSupervisor, SharedClient};
use super::{qos_from, ConnectionState, Publisher};
use async_trait::async_trait;
use lumen_bridge_error::publish::PublishError;
use lumen_bridge_error::PublishResult;
use lumen_bridge_models::settings::{Mqtt, PublishMode};
use rumqttc::QoS;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// MQTT-backed publisher.
///
/// In confirmed mode every publish waits for the client to accept the
/// message, bounded by the configured timeout, so the engine can trust a
/// success before advancing stored state. Fire-and-forget mode hands the
/// message to the client queue and reports only queue-level failures.
pub struct MqttPublisher {
    entry: SharedClient,
    qos: QoS,
    retain: bool,
    publish_timeout: Duration,
    mode: PublishMode,
}

impl MqttPublisher {
    /// Spawn the connection supervisor and return the publisher plus a
    /// receiver for the broker connection state.
    pub fn spawn(
        settings: &Mqtt,
        cancel: CancellationToken,
    ) -> (Arc<Self>, watch::Receiver<ConnectionState>) {
        let entry: SharedClient = Arc::new(ClientEntry::new_empty());
        let (state_tx, state_rx) = watch::channel(ConnectionState::Disconnected);

        MqttSupervisor::new(settings.clone(), cancel, state_tx, Arc::clone(&entry)).run();

        let publisher = Arc::new(Self {
            entry,
            qos: qos_from(settings.qos),
            retain: settings.retain,
            publish_timeout: Duration::from_millis(settings.publish_timeout_ms),
            mode: settings.publish_mode,
        });

        (publisher, state_rx)
    }

    /// Disconnect the underlying client, if connected.
    pub async fn disconnect(&self) {
        if let Some(client) = self.entry.client.load_full() {
            if let Err(e) = client.disconnect().await {
                warn!(error = %e, "MQTT disconnect failed");
            }
        }
    }
}

#[async_trait]
impl Publisher for MqttPublisher {
    async fn publish(&self, topic: &str, payload: &str) -> PublishResult<()> {
        let Some(client) = self.entry.client.load_full() else {
            return Err(PublishError::NotConnected);
        };
        if !self.entry.is_healthy() {
            return Err(PublishError::NotConnected);
        }

        match self.mode {
            PublishMode::Confirmed => {
                let send = client.publish(topic, self.qos, self.retain, payload.as_bytes().to_vec());
                match tokio::time::timeout(self.publish_timeout, send).await {
                    Ok(Ok(())) => Ok(()),
                    Ok(Err(e)) => {
                        warn!(topic, error = %e, "MQTT publish failed");
                        Err(PublishError::Client(e.to_string()))
                    }
                    Err(_) => {
                        warn!(
                            topic,
                            timeout_ms = self.publish_timeout.as_millis() as u64,
                            "MQTT publish timed out"
                        );
                        Err(PublishError::Timeout(self.publish_timeout))
                    }
                }
            }
            PublishMode::FireAndForget => client
                .try_publish(topic, self.qos, self.retain, payload.as_bytes().to_vec())
                .map_err(|e| {
                    warn!(topic, error = %e, "MQTT publish rejected by client queue");
                    PublishError::Client(e.to_string())
                }),
        }
    }
}
