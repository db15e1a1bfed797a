//! Network transport subsystem.
//!
//! # Data Flow
//! ```text
//! FetchRequest (method, absolute URL, headers, body)
//!     → Network::fetch
//!     → client.rs (hyper-util client, timeout, body buffering)
//!     → FetchResponse (status, headers, buffered body) or NetworkError
//! ```
//!
//! # Design Decisions
//! - Bodies are fully buffered; no partial content or streaming
//! - An error status is still a successful fetch; only transport
//!   problems produce `NetworkError`
//! - No retries or backoff at this layer
//! - Only GET requests are cacheable; strategies send the rest straight through

pub mod client;

use async_trait::async_trait;
use axum::http::{HeaderMap, Method, StatusCode};
use bytes::Bytes;
use std::time::Duration;
use thiserror::Error;

pub use client::HttpNetwork;

/// Headers that describe a single connection and must not be forwarded or stored.
pub(crate) const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-connection",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// An outbound request as seen by the interception engine.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub method: Method,
    /// Absolute URL. Matchers are evaluated against this string.
    pub url: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl FetchRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// Shorthand for a body-less GET.
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    /// Only GET requests are looked up in or written to a partition.
    /// Everything else always goes to the network.
    pub fn is_cacheable(&self) -> bool {
        self.method == Method::GET
    }

    /// Identity of this request inside a partition.
    pub fn cache_key(&self) -> String {
        format!("{} {}", self.method, self.url)
    }
}

/// A fully buffered response.
///
/// Cloning is cheap (`Bytes` is reference counted) and is the only way to
/// obtain a second owner: storage consumes the value it is given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl FetchResponse {
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// True for 2xx statuses.
    pub fn ok(&self) -> bool {
        self.status.is_success()
    }

    /// True for statuses below 400.
    pub fn is_usable(&self) -> bool {
        self.status.as_u16() < 400
    }
}

/// Error type for network fetches.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("failed to read response body: {0}")]
    Body(String),
}

/// Performs a network fetch for a request descriptor.
#[async_trait]
pub trait Network: Send + Sync {
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse, NetworkError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_includes_method() {
        let get = FetchRequest::get("http://origin/a");
        let post = FetchRequest::new(Method::POST, "http://origin/a");
        assert_eq!(get.cache_key(), "GET http://origin/a");
        assert_ne!(get.cache_key(), post.cache_key());
    }

    #[test]
    fn test_only_get_is_cacheable() {
        assert!(FetchRequest::get("http://origin/a").is_cacheable());
        assert!(!FetchRequest::new(Method::POST, "http://origin/a").is_cacheable());
        assert!(!FetchRequest::new(Method::HEAD, "http://origin/a").is_cacheable());
        assert!(!FetchRequest::new(Method::DELETE, "http://origin/a").is_cacheable());
    }

    #[test]
    fn test_status_classes() {
        let redirect = FetchResponse::new(StatusCode::FOUND, "");
        assert!(!redirect.ok());
        assert!(redirect.is_usable());

        let missing = FetchResponse::new(StatusCode::NOT_FOUND, "");
        assert!(!missing.ok());
        assert!(!missing.is_usable());

        assert!(FetchResponse::new(StatusCode::OK, "x").ok());
    }
}
