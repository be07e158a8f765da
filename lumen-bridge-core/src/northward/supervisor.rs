use super::{build_exponential_backoff, mqtt::connect_mqtt_client, ConnectionState};
use arc_swap::ArcSwapOption;
use backoff::backoff::Backoff;
use lumen_bridge_models::settings::Mqtt;
use rumqttc::{AsyncClient, ConnectReturnCode, Event, Packet};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Shared client entry for lock-free access from publishers.
///
/// The supervisor owns the connection lifecycle and swaps the client in on
/// connect and out on disconnect; publishers read it without locking.
pub(super) struct ClientEntry {
    /// MQTT client, present only while the broker connection is up.
    pub client: ArcSwapOption<AsyncClient>,
    /// Health flag for fast-path checks.
    pub healthy: AtomicBool,
}

impl ClientEntry {
    pub fn new_empty() -> Self {
        Self {
            client: ArcSwapOption::from(None),
            healthy: AtomicBool::new(false),
        }
    }

    #[inline]
    pub fn is_healthy(&self) -> bool {
        self.healthy.load(Ordering::Relaxed)
    }

    fn mark_connected(&self, client: AsyncClient) {
        self.client.store(Some(Arc::new(client)));
        self.healthy.store(true, Ordering::Relaxed);
    }

    fn mark_disconnected(&self) {
        self.healthy.store(false, Ordering::Relaxed);
        self.client.store(None);
    }
}

pub(super) type SharedClient = Arc<ClientEntry>;

/// MQTT connection supervisor with auto-reconnect.
///
/// Owns the client lifecycle: connects, drives the event loop until the
/// connection drops, then reconnects with exponential backoff until the
/// attempt cap (if any) is exhausted or the token is cancelled.
pub(super) struct MqttSupervisor {
    settings: Mqtt,
    cancel: CancellationToken,
    state_tx: watch::Sender<ConnectionState>,
    shared_client: SharedClient,
}

impl MqttSupervisor {
    pub fn new(
        settings: Mqtt,
        cancel: CancellationToken,
        state_tx: watch::Sender<ConnectionState>,
        shared_client: SharedClient,
    ) -> Self {
        Self {
            settings,
            cancel,
            state_tx,
            shared_client,
        }
    }

    /// Spawn the supervisor loop.
    ///
    /// Attempt counting: `None` or `Some(0)` retries forever; `Some(n)`
    /// gives up after n connection attempts and broadcasts `Failed`.
    pub fn run(self) {
        let settings = self.settings;
        let cancel = self.cancel;
        let state_tx = self.state_tx;
        let shared_client = self.shared_client;

        tokio::spawn(async move {
            let mut bo = build_exponential_backoff(&settings.retry);
            let mut attempt: u32 = 0;

            let should_retry = |current_attempt: u32| -> bool {
                match settings.retry.max_attempts {
                    None | Some(0) => true,
                    Some(max) => current_attempt < max,
                }
            };

            loop {
                if cancel.is_cancelled() {
                    info!("MQTT supervisor cancelled");
                    break;
                }

                if !should_retry(attempt) {
                    let _ = state_tx.send(ConnectionState::Failed(format!(
                        "max connection attempts ({:?}) exhausted",
                        settings.retry.max_attempts
                    )));
                    warn!(
                        max_attempts = ?settings.retry.max_attempts,
                        "MQTT supervisor exhausted connection attempts"
                    );
                    break;
                }
                attempt += 1;

                let _ = state_tx.send(ConnectionState::Connecting);
                let (client, mut event_loop) = connect_mqtt_client(&settings);

                // Drive the event loop until the connection drops.
                loop {
                    tokio::select! {
                        _ = cancel.cancelled() => {
                            shared_client.mark_disconnected();
                            let _ = client.disconnect().await;
                            let _ = state_tx.send(ConnectionState::Disconnected);
                            info!("MQTT supervisor cancelled, client disconnected");
                            return;
                        }
                        event = event_loop.poll() => match event {
                            Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                                if ack.code == ConnectReturnCode::Success {
                                    info!(
                                        host = %settings.host,
                                        port = settings.port,
                                        "connected to MQTT broker"
                                    );
                                    shared_client.mark_connected(client.clone());
                                    let _ = state_tx.send(ConnectionState::Connected);
                                    bo.reset();
                                    attempt = 0;
                                } else {
                                    warn!(code = ?ack.code, "MQTT broker rejected connection");
                                    shared_client.mark_disconnected();
                                    break;
                                }
                            }
                            Ok(event) => {
                                debug!(?event, "MQTT event");
                            }
                            Err(e) => {
                                warn!(error = %e, "MQTT connection lost, attempting to reconnect");
                                shared_client.mark_disconnected();
                                let _ = state_tx.send(ConnectionState::Disconnected);
                                break;
                            }
                        }
                    }
                }

                // Backoff before the next connection attempt.
                match bo.next_backoff() {
                    Some(delay) => {
                        debug!(delay_ms = delay.as_millis() as u64, "waiting before reconnect");
                        tokio::select! {
                            _ = cancel.cancelled() => {
                                info!("MQTT supervisor cancelled during backoff");
                                return;
                            }
                            _ = tokio::time::sleep(delay) => {}
                        }
                    }
                    None => {
                        let _ = state_tx.send(ConnectionState::Failed(
                            "reconnect backoff exhausted".to_string(),
                        ));
                        warn!("MQTT reconnect backoff exhausted");
                        return;
                    }
                }
            }
        });
    }
}
