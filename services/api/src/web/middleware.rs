//! services/api/src/web/middleware.rs
//!
//! Request logging for every route.

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::{info, warn};

/// Logs method, path, status and latency once the response is ready.
pub async fn log_requests(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let start = Instant::now();

    let response = next.run(req).await;

    let status = response.status();
    let latency = start.elapsed();
    if status.is_server_error() {
        warn!(%method, %uri, status = status.as_u16(), ?latency, "Request failed.");
    } else {
        info!(%method, %uri, status = status.as_u16(), ?latency, "Request handled.");
    }
    response
}
