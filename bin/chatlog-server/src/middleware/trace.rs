//! Per-request tracing.
//!
//! Every request runs inside an `http_request` span keyed by a trace id, taken
//! from the caller's `x-trace-id` header when it is a UUID and generated
//! otherwise. The id is forwarded to the handler and echoed on the response.
//!
//! Small JSON bodies are logged at debug level. A body is only buffered when
//! its size is known up front and fits [`MAX_LOGGED_BODY`]; everything else
//! streams through untouched, leaving size limits to the extractors.

use axum::body::{Body, HttpBody};
use axum::extract::Request;
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::{BoxError, Json};
use http_body_util::{BodyExt, LengthLimitError, Limited};
use serde_json::json;
use std::time::Instant;
use tracing::{Instrument, debug, error, info, info_span, warn};
use uuid::Uuid;

pub static X_TRACE_ID: &str = "x-trace-id";

/// Bodies larger than this are never buffered.
const MAX_LOGGED_BODY: usize = 1024;

pub async fn trace_middleware(req: Request, next: Next) -> Response {
    let started = Instant::now();

    let trace_id = req
        .headers()
        .get(X_TRACE_ID)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
        .unwrap_or_else(Uuid::new_v4);
    let trace_header = HeaderValue::from_str(&trace_id.to_string()).ok();

    let span = info_span!(
        "http_request",
        trace_id = %trace_id,
        method = %req.method(),
        path = %req.uri().path(),
    );

    async move {
        info!("→ request started");

        let (mut parts, body) = req.into_parts();
        let mut response = match inspect_body("request", &parts.headers, body).await {
            Ok(body) => {
                if let Some(value) = &trace_header {
                    parts.headers.insert(X_TRACE_ID, value.clone());
                }
                let response = next.run(Request::from_parts(parts, body)).await;
                let (parts, body) = response.into_parts();
                match inspect_body("response", &parts.headers, body).await {
                    Ok(body) => Response::from_parts(parts, body),
                    Err(e) => {
                        error!(error = %e, "failed to buffer response body");
                        error_response(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
                    }
                }
            }
            Err(e) => unreadable_request(e),
        };

        if let Some(value) = trace_header {
            response.headers_mut().insert(X_TRACE_ID, value);
        }

        info!(
            status = response.status().as_u16(),
            latency_ms = started.elapsed().as_millis(),
            "← response finished"
        );
        response
    }
    .instrument(span)
    .await
}

/// Log `body` when it is small JSON and hand it back, buffered or not.
async fn inspect_body(direction: &'static str, headers: &HeaderMap, body: Body) -> Result<Body, BoxError> {
    let is_json = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("application/json"));
    let fits = body
        .size_hint()
        .upper()
        .is_some_and(|n| n <= MAX_LOGGED_BODY as u64);
    if !(is_json && fits) {
        return Ok(body);
    }

    // The size hint comes from the peer; the limit holds even if it lied.
    let bytes = Limited::new(body, MAX_LOGGED_BODY).collect().await?.to_bytes();
    match std::str::from_utf8(&bytes) {
        Ok(text) => debug!(direction, body = %text, "body"),
        Err(_) => debug!(direction, size = bytes.len(), "body is not utf-8"),
    }
    Ok(Body::from(bytes))
}

fn unreadable_request(err: BoxError) -> Response {
    let (status, message) = if err.downcast_ref::<LengthLimitError>().is_some() {
        (StatusCode::PAYLOAD_TOO_LARGE, "request body too large")
    } else {
        (StatusCode::BAD_REQUEST, "failed to read request body")
    };
    warn!(error = %err, status = status.as_u16(), "rejecting request body");
    error_response(status, message)
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
