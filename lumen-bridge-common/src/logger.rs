use lumen_bridge_error::{LbError, LbResult};
use lumen_bridge_models::constants::{LOG_DIR, LOG_FILE_NAME};
use lumen_bridge_models::settings::Log;
use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{
    filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, Layer,
};

/// Logging bootstrap.
///
/// Installs a console layer and, when enabled in settings, a non-blocking
/// daily-rolling file layer. The returned value must stay alive for the
/// process lifetime; dropping it flushes and closes the file writer.
pub struct Logger {
    _file_guard: Option<WorkerGuard>,
}

impl Logger {
    /// Initialize the global subscriber from log settings.
    ///
    /// The level filter comes from `RUST_LOG` when set, falling back to the
    /// configured level.
    pub fn init(settings: &Log) -> LbResult<Self> {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&settings.level))
            .map_err(|e| LbError::InitializationError(format!("invalid log level: {e}")))?;

        let console_layer = fmt::layer().with_target(false);

        let (file_layer, file_guard) = if settings.file {
            let file_appender = rolling::daily(LOG_DIR, LOG_FILE_NAME);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .boxed();
            (Some(layer), Some(guard))
        } else {
            (None, None)
        };

        tracing_subscriber::registry()
            .with(filter)
            .with(console_layer)
            .with(file_layer)
            .try_init()
            .map_err(|e| LbError::InitializationError(format!("failed to set logger: {e}")))?;

        Ok(Logger {
            _file_guard: file_guard,
        })
    }
}
