// HTTP middleware

use axum::{
    extract::Request,
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request tracing middleware; tags every request with a fresh id
pub async fn trace_request_mw(request: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let span = tracing::info_span!("request", id = %request_id);

    tracing::debug!(parent: &span, "→ {} {}", method, uri);

    let mut response = next.run(request).instrument(span.clone()).await;

    let duration = start.elapsed();
    let status = response.status();

    tracing::debug!(
        parent: &span,
        "← {} {} {} ({:?})",
        method,
        uri,
        status.as_u16(),
        duration
    );

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}
