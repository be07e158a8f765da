use clap::Parser;
use lumen_bridge_common::{shutdown_signal, Logger};
use lumen_bridge_core::{
    northward::{wait_connected, MqttPublisher},
    BatchProcessor, ChannelRegistry, ChannelStateStore, Publisher,
};
use lumen_bridge_error::{LbError, LbResult};
use lumen_bridge_models::{constants::DEFAULT_CONFIG_FILE_NAME, settings::StartPolicy, Settings};
use lumen_bridge_web::LbWebServer;
use std::{env::current_dir, path::PathBuf, sync::Arc, time::Duration};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Lumen Bridge - HTTP to MQTT bridge for channel-based lighting control
///
/// Accepts batched channel readings over HTTP and republishes changed
/// sub-signal values (intensity, color, on/off) to per-channel MQTT topics.
#[derive(Parser)]
#[command(name = "lumen-bridge")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Lumen Bridge", long_about = None)]
struct Cli {
    /// Sets a custom config file with full path
    ///
    /// If not specified, the bridge will look for 'bridge.toml' in the
    /// current working directory.
    #[arg(short, long, env = "LB_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> LbResult<()> {
    let cli = Cli::parse();

    let config_path = match cli.config {
        Some(p) => p,
        None => {
            let dir = current_dir()
                .map_err(|e| LbError::from(format!("Failed to get current directory: {e}")))?;
            dir.join(DEFAULT_CONFIG_FILE_NAME)
        }
    };

    let settings = Settings::new(config_path.to_string_lossy().to_string())?;
    settings.validate()?;

    let _logger = Logger::init(&settings.log)?;
    info!(config = %config_path.display(), "configuration loaded");

    let registry = Arc::new(ChannelRegistry::from_mappings(settings.channels.clone())?);
    info!(channels = registry.len(), "channel registry built");

    let store = Arc::new(ChannelStateStore::new());

    // Northward MQTT connection, supervised with auto-reconnect.
    let cancel = CancellationToken::new();
    let (publisher, mut state_rx) = MqttPublisher::spawn(&settings.mqtt, cancel.child_token());

    if let StartPolicy::WaitConnected { timeout_ms } = settings.mqtt.start_policy {
        wait_connected(&mut state_rx, Duration::from_millis(timeout_ms))
            .await
            .map_err(|e| {
                LbError::InitializationError(format!(
                    "failed to connect to MQTT broker {}:{}: {e}",
                    settings.mqtt.host, settings.mqtt.port
                ))
            })?;
    }

    let processor = Arc::new(BatchProcessor::new(
        registry,
        store,
        Arc::clone(&publisher) as Arc<dyn Publisher>,
    ));

    let web_server = LbWebServer::start(&settings, processor).await?;

    shutdown_signal().await;
    info!("starting graceful shutdown");

    web_server.stop().await?;
    cancel.cancel();
    publisher.disconnect().await;

    info!("bridge shut down gracefully");
    Ok(())
}
