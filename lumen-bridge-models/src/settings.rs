use config::{Config, File};
use lumen_bridge_error::{LbError, LbResult};
use serde::{self, Deserialize};
use std::{collections::HashSet, ops::Deref, sync::Arc};

use crate::channel::ChannelMapping;

#[derive(Debug, Clone)]
pub struct Settings(Arc<Inner>);

impl Deref for Settings {
    type Target = Inner;
    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

impl Settings {
    pub fn new(config_path: String) -> LbResult<Self> {
        let builder = Config::builder()
            .add_source(File::with_name(config_path.as_str()).required(false))
            .add_source(
                config::Environment::with_prefix("LB")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("web.cors.whitelist.origins")
                    .with_list_parse_key("web.cors.whitelist.methods")
                    .with_list_parse_key("web.cors.whitelist.headers")
                    .with_list_parse_key("web.cors.whitelist.expose_headers"),
            );
        let inner: Inner = builder.build()?.try_deserialize()?;
        Ok(Self(Arc::new(inner)))
    }

    /// Build settings directly from an already-deserialized inner value.
    ///
    /// Intended for tests and embedding; production startup goes through
    /// `Settings::new`.
    pub fn from_inner(inner: Inner) -> Self {
        Self(Arc::new(inner))
    }

    /// Validate the loaded configuration before any component starts.
    ///
    /// Checks mirror what the engine relies on at runtime: a reachable
    /// broker host, at least one channel mapping, three non-empty topics per
    /// mapping, and unique channel numbers.
    pub fn validate(&self) -> LbResult<()> {
        if self.mqtt.host.trim().is_empty() {
            return Err(LbError::InvalidSettings(
                "mqtt.host must be set".to_string(),
            ));
        }
        if self.channels.is_empty() {
            return Err(LbError::InvalidSettings(
                "at least one channel mapping must be configured".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        for (i, mapping) in self.channels.iter().enumerate() {
            if mapping.intensity_topic.is_empty()
                || mapping.color_topic.is_empty()
                || mapping.on_off_topic.is_empty()
            {
                return Err(LbError::InvalidSettings(format!(
                    "channel mapping for channel {} (at index {}) must have intensity_topic, color_topic and on_off_topic set",
                    mapping.channel, i
                )));
            }
            if !seen.insert(mapping.channel) {
                return Err(LbError::InvalidSettings(format!(
                    "duplicate channel mapping for channel {}",
                    mapping.channel
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Inner {
    #[serde(default)]
    pub web: Web,
    #[serde(default)]
    pub mqtt: Mqtt,
    #[serde(default)]
    pub log: Log,
    #[serde(default)]
    pub channels: Vec<ChannelMapping>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Web {
    #[serde(default = "Web::host_default")]
    pub host: String,
    #[serde(default = "Web::port_default")]
    pub port: u16,
    #[serde(default)]
    pub cors: Cors,
}

impl Default for Web {
    fn default() -> Self {
        Web {
            host: Web::host_default(),
            port: Web::port_default(),
            cors: Cors::default(),
        }
    }
}

impl Web {
    fn host_default() -> String {
        "0.0.0.0".into()
    }

    fn port_default() -> u16 {
        8080
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Cors {
    #[serde(default)]
    pub mode: CorsMode,
    #[serde(default)]
    pub whitelist: CorsWhitelist,
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CorsMode {
    #[default]
    AllowAll,
    Whitelist,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsWhitelist {
    #[serde(default)]
    pub origins: Vec<String>,
    #[serde(default = "CorsWhitelist::methods_default")]
    pub methods: Vec<String>,
    #[serde(default = "CorsWhitelist::headers_default")]
    pub headers: Vec<String>,
    #[serde(default)]
    pub expose_headers: Vec<String>,
    #[serde(default)]
    pub credentials: bool,
}

impl Default for CorsWhitelist {
    fn default() -> Self {
        CorsWhitelist {
            origins: Vec::new(),
            methods: CorsWhitelist::methods_default(),
            headers: CorsWhitelist::headers_default(),
            expose_headers: Vec::new(),
            credentials: false,
        }
    }
}

impl CorsWhitelist {
    fn methods_default() -> Vec<String> {
        vec!["POST".into(), "OPTIONS".into()]
    }

    fn headers_default() -> Vec<String> {
        vec!["Content-Type".into(), "Authorization".into()]
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Mqtt {
    /// MQTT broker host.
    #[serde(default = "Mqtt::host_default")]
    pub host: String,
    /// MQTT broker port.
    #[serde(default = "Mqtt::port_default")]
    pub port: u16,
    /// Client id; auto-generated with a short random suffix when unset.
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// MQTT keep-alive interval in seconds.
    #[serde(default = "Mqtt::keep_alive_default")]
    pub keep_alive: u16,
    #[serde(default = "Mqtt::clean_session_default")]
    pub clean_session: bool,
    /// MQTT QoS level (0, 1 or 2).
    #[serde(default)]
    pub qos: u8,
    #[serde(default)]
    pub retain: bool,
    /// Bounded wait for one publish operation in confirmed mode.
    #[serde(default = "Mqtt::publish_timeout_ms_default")]
    pub publish_timeout_ms: u64,
    #[serde(default)]
    pub publish_mode: PublishMode,
    #[serde(default)]
    pub start_policy: StartPolicy,
    #[serde(default)]
    pub retry: RetryPolicy,
}

impl Default for Mqtt {
    fn default() -> Self {
        Mqtt {
            host: Mqtt::host_default(),
            port: Mqtt::port_default(),
            client_id: None,
            username: None,
            password: None,
            keep_alive: Mqtt::keep_alive_default(),
            clean_session: Mqtt::clean_session_default(),
            qos: 0,
            retain: false,
            publish_timeout_ms: Mqtt::publish_timeout_ms_default(),
            publish_mode: PublishMode::default(),
            start_policy: StartPolicy::default(),
            retry: RetryPolicy::default(),
        }
    }
}

impl Mqtt {
    fn host_default() -> String {
        "127.0.0.1".into()
    }

    fn port_default() -> u16 {
        1883
    }

    fn keep_alive_default() -> u16 {
        60
    }

    fn clean_session_default() -> bool {
        true
    }

    fn publish_timeout_ms_default() -> u64 {
        5_000
    }
}

/// Delivery mode for outbound publishes.
///
/// The engine only advances stored sub-signal state on a confirmed success,
/// so `Confirmed` is the default; `FireAndForget` trades the retry guarantee
/// for throughput.
#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PublishMode {
    #[default]
    Confirmed,
    FireAndForget,
}

/// Start policy for the MQTT connection at process startup.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum StartPolicy {
    /// Start the connection in the background and serve immediately.
    FireAndForget,
    /// Block startup until the broker connection is established or the
    /// timeout elapses.
    WaitConnected { timeout_ms: u64 },
}

impl Default for StartPolicy {
    fn default() -> Self {
        StartPolicy::WaitConnected { timeout_ms: 10_000 }
    }
}

/// Reconnect policy with exponential backoff and an optional attempt cap.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
pub struct RetryPolicy {
    /// Maximum number of connection attempts (`None` or `0` = unlimited).
    #[serde(default)]
    pub max_attempts: Option<u32>,
    #[serde(default = "RetryPolicy::initial_interval_ms_default")]
    pub initial_interval_ms: u64,
    #[serde(default = "RetryPolicy::max_interval_ms_default")]
    pub max_interval_ms: u64,
    /// Randomization factor in range [0.0, 1.0].
    #[serde(default = "RetryPolicy::randomization_factor_default")]
    pub randomization_factor: f64,
    #[serde(default = "RetryPolicy::multiplier_default")]
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: None,
            initial_interval_ms: RetryPolicy::initial_interval_ms_default(),
            max_interval_ms: RetryPolicy::max_interval_ms_default(),
            randomization_factor: RetryPolicy::randomization_factor_default(),
            multiplier: RetryPolicy::multiplier_default(),
        }
    }
}

impl RetryPolicy {
    fn initial_interval_ms_default() -> u64 {
        1_000
    }

    fn max_interval_ms_default() -> u64 {
        60_000
    }

    fn randomization_factor_default() -> f64 {
        0.2
    }

    fn multiplier_default() -> f64 {
        2.0
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Log {
    /// Log level filter (`trace`, `debug`, `info`, `warn`, `error`).
    #[serde(default = "Log::level_default")]
    pub level: String,
    /// Enable daily-rolling file output in addition to the console.
    #[serde(default)]
    pub file: bool,
}

impl Default for Log {
    fn default() -> Self {
        Log {
            level: Log::level_default(),
            file: false,
        }
    }
}

impl Log {
    fn level_default() -> String {
        "info".into()
    }
}
