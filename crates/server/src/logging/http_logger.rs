// SPDX-License-Identifier: GPL-3.0-or-later

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;

/// Logs every request as `METHOD /path?query STATUS DURATIONms` under the
/// `http` target.
///
/// Successful requests are logged at DEBUG (visible with `UMD_LOG_LEVEL=http`),
/// client errors at WARN and server errors at ERROR. Streaming responses are
/// logged when their headers are sent.
pub async fn http_logger_middleware(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = match req.uri().query() {
        Some(query) => format!("{}?{}", req.uri().path(), query),
        None => req.uri().path().to_string(),
    };
    let start = Instant::now();

    let response = next.run(req).await;

    let status = response.status().as_u16();
    let duration_ms = start.elapsed().as_millis();

    macro_rules! log_request {
        ($level:ident) => {
            tracing::$level!(
                target: "http",
                method = %method,
                path = %path,
                status,
                duration_ms,
                "{} {} {} {}ms",
                method,
                path,
                status,
                duration_ms
            )
        };
    }

    match status {
        500.. => log_request!(error),
        400..=499 => log_request!(warn),
        _ => log_request!(debug),
    }

    response
}
