use lumen_bridge_models::constants::CLIENT_ID_PREFIX;
use lumen_bridge_models::settings::Mqtt;
use rumqttc::{AsyncClient, EventLoop, MqttOptions};
use std::time::Duration;
use uuid::Uuid;

/// Create the MQTT client and its event loop from settings.
///
/// The supervisor owns both; the client only becomes visible to publishers
/// after the broker acknowledges the connection.
pub(super) fn connect_mqtt_client(settings: &Mqtt) -> (AsyncClient, EventLoop) {
    let mut mqtt_options = MqttOptions::new(client_id(settings), &settings.host, settings.port);

    if let Some(username) = &settings.username {
        mqtt_options.set_credentials(username, settings.password.as_deref().unwrap_or(""));
    }

    mqtt_options.set_keep_alive(Duration::from_secs(settings.keep_alive as u64));
    mqtt_options.set_clean_session(settings.clean_session);

    AsyncClient::new(mqtt_options, 100)
}

/// Configured client id, or a generated one with a short random suffix.
#[inline]
fn client_id(settings: &Mqtt) -> String {
    match &settings.client_id {
        Some(id) if !id.is_empty() => id.clone(),
        _ => {
            let short = Uuid::new_v4().simple().to_string();
            format!("{}-{}", CLIENT_ID_PREFIX, &short[..8])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_id_configured() {
        let settings = Mqtt {
            client_id: Some("bridge-01".into()),
            ..Mqtt::default()
        };
        assert_eq!(client_id(&settings), "bridge-01");
    }

    #[test]
    fn test_client_id_generated() {
        let settings = Mqtt::default();
        let id = client_id(&settings);
        assert!(id.starts_with("lumen-bridge-"));
        assert_eq!(id.len(), CLIENT_ID_PREFIX.len() + 1 + 8);
    }
}
