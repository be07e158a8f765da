//! Web server module for the Lumen Bridge application
pub mod api;
mod middleware;

pub use middleware::cors::middleware as cors_middleware;

use actix_web::{
    dev::ServerHandle,
    middleware::{Logger, NormalizePath},
    web::{self, Data},
    App, HttpServer,
};
use lumen_bridge_core::BatchProcessor;
use lumen_bridge_error::web::WebError;
use lumen_bridge_error::{LbError, LbResult};
use lumen_bridge_models::Settings;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, instrument};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    processor: Arc<BatchProcessor>,
}

impl AppState {
    pub fn new(processor: Arc<BatchProcessor>) -> Self {
        Self { processor }
    }

    pub fn processor(&self) -> &BatchProcessor {
        &self.processor
    }
}

/// JSON extractor configuration: malformed bodies become a 400 with the
/// standard error envelope instead of actix's default error page.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| WebError::BadRequest(format!("invalid JSON payload: {err}")).into())
}

/// LbWebServer handles the web server initialization and management
#[derive(Clone)]
pub struct LbWebServer {
    /// Server handle for graceful shutdown
    server: Arc<Mutex<Option<ServerHandle>>>,
}

impl LbWebServer {
    /// Create, bind and start the HTTP server.
    #[instrument(name = "init-web-server", skip_all)]
    pub async fn start(settings: &Settings, processor: Arc<BatchProcessor>) -> LbResult<Self> {
        let addr = format!("{}:{}", settings.web.host, settings.web.port);
        let cors_config = settings.web.cors.clone();
        let state = AppState::new(processor);

        let server = HttpServer::new(move || {
            App::new()
                .app_data(Data::new(state.clone()))
                .app_data(json_config())
                .wrap(middleware::cors::middleware(&cors_config))
                .wrap(Logger::default())
                .wrap(NormalizePath::trim())
                .configure(api::configure_routes)
        })
        .bind(&addr)
        .map_err(|e| LbError::from(format!("Failed to bind HTTP server to {addr}: {e}")))?
        .run();

        let server_handle = server.handle();
        info!(%addr, "HTTP server listening");

        tokio::spawn(async move {
            if let Err(e) = server.await {
                error!(error = %e, "Web server failed");
            }
        });

        Ok(LbWebServer {
            server: Arc::new(Mutex::new(Some(server_handle))),
        })
    }

    /// Gracefully stop the web server
    #[instrument(name = "web-server-stop", skip_all)]
    pub async fn stop(&self) -> LbResult<()> {
        info!("Stopping web server...");
        let mut server_guard = self.server.lock().await;
        if let Some(handle) = server_guard.take() {
            handle.stop(true).await;
        }
        info!("Web server stopped");

        Ok(())
    }
}
