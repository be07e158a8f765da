//! Batched data-point ingress.

use crate::AppState;
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};
use chrono::Utc;
use lumen_bridge_error::web::WebError;
use lumen_bridge_error::WebResult;
use lumen_bridge_models::web::WebResponse;
use lumen_bridge_models::DataPoint;
use serde::{Deserialize, Serialize};

/// Configure ingest routes.
pub fn configure_ingest_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/post", web::post().to(ingest));
}

/// Batch outcome carried in the response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct IngestSummary {
    /// Accepted data points.
    pub processed: usize,
    /// Aggregated human-readable error list, empty on full success.
    pub errors: Vec<String>,
}

/// Accept a JSON array of data points and route it through the batch
/// processor.
///
/// The request timestamp is taken once at arrival and shared by every point
/// in the batch. Full success returns 200; any per-point or per-publish
/// error returns 207 with the aggregated list, so clients can tell a partial
/// failure from a malformed request (400).
async fn ingest(
    state: web::Data<AppState>,
    points: web::Json<Vec<DataPoint>>,
) -> WebResult<HttpResponse> {
    let request_ts = Utc::now();

    let report = state
        .processor()
        .process(request_ts, &points)
        .await
        .map_err(|e| WebError::BadRequest(e.to_string()))?;

    let summary = IngestSummary {
        processed: report.processed,
        errors: report.all_errors(),
    };

    if summary.errors.is_empty() {
        let message = format!("successfully processed {} data points", summary.processed);
        Ok(HttpResponse::Ok().json(WebResponse::new(
            lumen_bridge_models::web::ResponseCode::Success,
            &message,
            Some(summary),
        )))
    } else {
        Ok(HttpResponse::build(StatusCode::MULTI_STATUS)
            .json(WebResponse::partial("completed with errors", summary)))
    }
}
