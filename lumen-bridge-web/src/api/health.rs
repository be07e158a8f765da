//! Health check endpoint.
//!
//! Returns a fixed OK regardless of broker or channel state, so probes only
//! measure process liveness.

use actix_web::{web, HttpResponse};

/// Configure health check routes.
pub fn configure_health_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health));
}

/// Simple health check handler.
async fn health() -> HttpResponse {
    HttpResponse::Ok().body("OK")
}
