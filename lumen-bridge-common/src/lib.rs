//! Process-level plumbing shared by the bridge binary: logging bootstrap and
//! shutdown signal handling.

mod logger;

pub use logger::Logger;

// Re-export error types
pub use lumen_bridge_error::{LbError, LbResult};

#[cfg(windows)]
use tokio::signal::ctrl_c;
#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};
use tracing::info;

/// Wait for a termination signal (SIGINT or SIGTERM on unix, Ctrl-C on
/// windows).
///
/// Returns once the process should begin graceful shutdown.
#[cfg(unix)]
pub async fn shutdown_signal() {
    let mut sigint = signal(SignalKind::interrupt()).expect("install SIGINT handler");
    let mut sigterm = signal(SignalKind::terminate()).expect("install SIGTERM handler");

    tokio::select! {
        _ = sigint.recv() => info!("Received SIGINT"),
        _ = sigterm.recv() => info!("Received SIGTERM"),
    }
}

#[cfg(windows)]
pub async fn shutdown_signal() {
    let _ = ctrl_c().await;
    info!("Received Ctrl-C");
}
