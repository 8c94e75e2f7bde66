use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::{error, info, warn};

/// 按状态码级别记录每个请求的耗时
pub async fn request_logging(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let uri = req.uri().clone();

    info!("Incoming request: {} {}", method, uri);

    let response = next.run(req).await;
    let status = response.status();
    let duration = start.elapsed();

    if status.is_success() {
        info!("Request completed: {} {} - {}ms", method, uri, duration.as_millis());
    } else if status.is_client_error() {
        warn!("Client error: {} {} - {} ({}ms)", method, uri, status, duration.as_millis());
    } else {
        error!("Server error: {} {} - {} ({}ms)", method, uri, status, duration.as_millis());
    }

    response
}
