//! Router module for the bridge's HTTP endpoints

pub mod health;
pub mod ingest;

use actix_web::web;

/// Configure all routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(health::configure_health_routes)
        .configure(ingest::configure_ingest_routes);
}
