//! HTTP transport backed by the hyper-util legacy client.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Request;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use std::time::Duration;
use tokio::time;

use super::{FetchRequest, FetchResponse, Network, NetworkError, HOP_BY_HOP};

/// Fetches requests from plain-HTTP upstreams.
#[derive(Clone)]
pub struct HttpNetwork {
    client: Client<HttpConnector, Body>,
    timeout: Duration,
    max_body_bytes: usize,
}

impl HttpNetwork {
    pub fn new(timeout: Duration, max_body_bytes: usize) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        Self {
            client,
            timeout,
            max_body_bytes,
        }
    }
}

#[async_trait]
impl Network for HttpNetwork {
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse, NetworkError> {
        let mut builder = Request::builder()
            .method(request.method.clone())
            .uri(request.url.as_str());

        if let Some(headers) = builder.headers_mut() {
            for (name, value) in request.headers.iter() {
                if name == "host" || HOP_BY_HOP.contains(&name.as_str()) {
                    continue;
                }
                headers.append(name.clone(), value.clone());
            }
        }

        let upstream_request = builder
            .body(Body::from(request.body.clone()))
            .map_err(|e| NetworkError::InvalidRequest(e.to_string()))?;

        // One deadline covers the response head and the full body read.
        let exchange = async {
            let response = self.client.request(upstream_request).await.map_err(|e| {
                tracing::debug!(url = %request.url, error = %e, "Upstream transport error");
                NetworkError::Transport(e.to_string())
            })?;

            let (parts, body) = response.into_parts();
            let body = axum::body::to_bytes(Body::new(body), self.max_body_bytes)
                .await
                .map_err(|e| NetworkError::Body(e.to_string()))?;
            Ok::<_, NetworkError>((parts, body))
        };

        let (mut parts, body) = match time::timeout(self.timeout, exchange).await {
            Ok(result) => result?,
            Err(_) => {
                tracing::debug!(url = %request.url, timeout = ?self.timeout, "Upstream fetch timed out");
                return Err(NetworkError::Timeout(self.timeout));
            }
        };

        for name in HOP_BY_HOP {
            parts.headers.remove(*name);
        }

        Ok(FetchResponse {
            status: parts.status,
            headers: parts.headers,
            body,
        })
    }
}
