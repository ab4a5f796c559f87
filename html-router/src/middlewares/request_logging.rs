use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};
use tracing::debug;

/// Logs each page view with its final status and handling time.
pub async fn log_page_views(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let started = Instant::now();

    let response = next.run(request).await;

    debug!(
        %method,
        %path,
        status = response.status().as_u16(),
        elapsed = ?started.elapsed(),
        "page view"
    );
    response
}
