//! Response translation.
//!
//! # Responsibilities
//! - Turn a served response into an HTTP response, tagged with `x-cache`
//! - Map engine failures to gateway status codes
//!
//! # Status Mapping
//! - Configuration error → 500
//! - Network failure → 502 (timeout → 504)
//! - No cached response → 504
//! - Storage failure → 500

use axum::body::Body;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::error::{ComposeError, StrategyError};
use crate::network::NetworkError;
use crate::strategy::Served;

pub const X_CACHE: &str = "x-cache";

pub fn served(served: Served) -> Response {
    let mut response = Response::new(Body::from(served.response.body));
    *response.status_mut() = served.response.status;
    *response.headers_mut() = served.response.headers;
    response
        .headers_mut()
        .insert(X_CACHE, HeaderValue::from_static(served.source.as_header()));
    response
}

pub fn status_for(error: &ComposeError) -> StatusCode {
    match error {
        ComposeError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        ComposeError::Strategy(StrategyError::Network(NetworkError::Timeout(_))) => {
            StatusCode::GATEWAY_TIMEOUT
        }
        ComposeError::Strategy(StrategyError::Network(_)) => StatusCode::BAD_GATEWAY,
        ComposeError::Strategy(StrategyError::NoCachedResponse { .. }) => StatusCode::GATEWAY_TIMEOUT,
        ComposeError::Strategy(StrategyError::Store(_)) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn failure(error: &ComposeError) -> Response {
    (status_for(error), error.to_string()).into_response()
}
