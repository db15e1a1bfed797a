//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the interception handler
//! - Wire up middleware (request id, tracing, timeout)
//! - Bind server to listener
//! - Hand every request to the composer and translate the outcome

use axum::{
    body::Body,
    extract::State,
    http::{HeaderName, Request},
    response::Response,
    routing::any,
    Router,
};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::composer::Composer;
use crate::config::ComposerConfig;
use crate::http::request::{to_fetch_request, X_REQUEST_ID};
use crate::http::response;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub composer: Composer,
    pub upstream: String,
    pub max_body_bytes: usize,
}

/// HTTP front end of the caching engine.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(config: &ComposerConfig, composer: Composer) -> Self {
        let state = AppState {
            composer,
            upstream: config.upstream.base_url.clone(),
            max_body_bytes: config.listener.max_body_bytes,
        };

        Self {
            router: Self::build_router(config, state),
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ComposerConfig, state: AppState) -> Router {
        let request_id = HeaderName::from_static(X_REQUEST_ID);

        // The request timeout leaves one second on top of the upstream timeout
        // so upstream timeouts are reported by the engine, not cut short here.
        let timeout = Duration::from_secs(config.upstream.timeout_secs + 1);

        Router::new()
            .route("/{*path}", any(intercept_handler))
            .route("/", any(intercept_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::new(request_id))
                    .layer(TimeoutLayer::new(timeout)),
            )
    }

    /// Serve until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Intercepts every request and lets the composer decide how to serve it.
async fn intercept_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let fetch_request = match to_fetch_request(request, &state.upstream, state.max_body_bytes).await {
        Ok(r) => r,
        Err(rejection) => return rejection,
    };

    tracing::debug!(
        request_id = %request_id,
        method = %fetch_request.method,
        url = %fetch_request.url,
        "Intercepted request"
    );

    match state.composer.handle(fetch_request).await {
        Ok(served) => {
            tracing::debug!(
                request_id = %request_id,
                status = %served.response.status,
                source = served.source.as_header(),
                "Request served"
            );
            response::served(served)
        }
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Request failed");
            response::failure(&e)
        }
    }
}
