//! Request translation.
//!
//! # Responsibilities
//! - Resolve the absolute upstream URL matchers are evaluated against
//! - Buffer the request body within the configured limit
//! - Produce the `FetchRequest` handed to the composer

use axum::body::Body;
use axum::http::{Request, StatusCode, Uri};
use axum::response::{IntoResponse, Response};

use crate::network::FetchRequest;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Join the incoming path and query onto the upstream base URL.
pub fn upstream_url(base: &str, uri: &Uri) -> String {
    let path = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
    format!("{}{}", base.trim_end_matches('/'), path)
}

/// Convert an incoming request into a `FetchRequest` for the upstream.
///
/// Returns a ready `413 Payload Too Large` response when the body exceeds `max_body_bytes`.
pub async fn to_fetch_request(
    request: Request<Body>,
    base: &str,
    max_body_bytes: usize,
) -> Result<FetchRequest, Response> {
    let url = upstream_url(base, request.uri());
    let (parts, body) = request.into_parts();

    let body = axum::body::to_bytes(body, max_body_bytes).await.map_err(|e| {
        tracing::warn!(url = %url, error = %e, "Rejecting request body");
        (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large").into_response()
    })?;

    Ok(FetchRequest {
        method: parts.method,
        url,
        headers: parts.headers,
        body,
    })
}
