//! The interception engine.
//!
//! A `Composer` is built once from the ordered route table and the two
//! collaborators (partition storage and network). The host calls
//! `activate` once at startup and `intercept` for every outbound request.

use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;

use crate::config::RouteConfig;
use crate::error::{ComposeError, ConfigurationError, StrategyError};
use crate::lifecycle::{reconcile, ReconcileReport};
use crate::network::{FetchRequest, Network};
use crate::observability::metrics;
use crate::routing::Router;
use crate::storage::{CacheStorage, StoreError};
use crate::strategy::{self, Served, StrategyContext, StrategyFuture};

/// Decision for one intercepted request.
pub enum Interception {
    /// No route matched; the host should handle the request as usual.
    Passthrough(FetchRequest),
    /// A route matched; awaiting the future yields the response or the failure.
    Respond(StrategyFuture),
}

impl std::fmt::Debug for Interception {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Interception::Passthrough(request) => {
                f.debug_tuple("Passthrough").field(&request.url).finish()
            }
            Interception::Respond(_) => f.write_str("Respond(..)"),
        }
    }
}

/// Routes intercepted requests to caching strategies and reconciles partitions.
#[derive(Clone)]
pub struct Composer {
    router: Arc<Router>,
    storage: Arc<dyn CacheStorage>,
    network: Arc<dyn Network>,
}

impl Composer {
    pub fn new(router: Router, storage: Arc<dyn CacheStorage>, network: Arc<dyn Network>) -> Self {
        tracing::info!(routes = router.routes().len(), "Composer initialized");
        Self {
            router: Arc::new(router),
            storage,
            network,
        }
    }

    /// Compile `routes` and build the engine.
    pub fn from_config(
        routes: Vec<RouteConfig>,
        storage: Arc<dyn CacheStorage>,
        network: Arc<dyn Network>,
    ) -> Result<Self, ConfigurationError> {
        Ok(Self::new(Router::from_config(routes)?, storage, network))
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Delete every stored partition the route table does not declare.
    ///
    /// Resolves once every deletion has settled.
    pub async fn activate(&self) -> Result<ReconcileReport, StoreError> {
        reconcile(self.storage.as_ref(), &self.router.expected_partitions()).await
    }

    /// Decide how to serve `request`.
    ///
    /// An unknown strategy type on the matched route is returned immediately,
    /// before any I/O is started.
    pub fn intercept(&self, request: FetchRequest) -> Result<Interception, ConfigurationError> {
        let Some(route) = self.router.resolve(&request.url).cloned() else {
            tracing::debug!(url = %request.url, "No route matched, passing through");
            return Ok(Interception::Passthrough(request));
        };

        let kind = route.kind()?;
        let span = tracing::debug_span!(
            "strategy",
            route = %route.name(),
            strategy = %kind,
            url = %request.url
        );

        let pending = strategy::dispatch(
            kind,
            StrategyContext {
                route,
                request,
                storage: self.storage.clone(),
                network: self.network.clone(),
            },
        );

        Ok(Interception::Respond(Box::pin(
            async move {
                let start = Instant::now();
                let result = pending.await;
                metrics::record_strategy_duration(kind.as_str(), start);
                result
            }
            .instrument(span),
        )))
    }

    /// Intercept `request` and drive it to completion, fetching unmatched
    /// requests straight from the network.
    pub async fn handle(&self, request: FetchRequest) -> Result<Served, ComposeError> {
        match self.intercept(request)? {
            Interception::Respond(pending) => Ok(pending.await?),
            Interception::Passthrough(request) => {
                let response = self
                    .network
                    .fetch(request)
                    .await
                    .map_err(StrategyError::from)?;
                Ok(Served::bypass(response))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{FetchResponse, NetworkError};
    use crate::storage::{MemoryStorage, PartitionId};
    use crate::strategy::testing::ScriptedNetwork;
    use crate::routing::Route;
    use crate::strategy::{Source, StrategyOverride};
    use axum::http::{Method, StatusCode};

    fn routes() -> Vec<RouteConfig> {
        vec![
            RouteConfig::new("api", 1, "network_first").with_prefix("http://origin/api/"),
            RouteConfig::new("static", 1, "cache_first").with_pattern(r"\.(js|css)$"),
        ]
    }

    fn composer(storage: &MemoryStorage, network: Arc<ScriptedNetwork>) -> Composer {
        Composer::from_config(routes(), Arc::new(storage.clone()), network).unwrap()
    }

    #[tokio::test]
    async fn test_unmatched_request_passes_through() {
        let network = ScriptedNetwork::new(vec![Ok(FetchResponse::new(StatusCode::OK, "page"))]);
        let composer = composer(&MemoryStorage::default(), network.clone());

        let decision = composer.intercept(FetchRequest::get("http://origin/index.html")).unwrap();
        assert!(matches!(decision, Interception::Passthrough(ref r) if r.url == "http://origin/index.html"));
        assert_eq!(network.calls(), 0);

        let served = composer.handle(FetchRequest::get("http://origin/index.html")).await.unwrap();
        assert_eq!(served.source, Source::Bypass);
        assert_eq!(network.calls(), 1);
    }

    #[tokio::test]
    async fn test_cache_first_round_trip_through_engine() {
        let storage = MemoryStorage::default();
        let network = ScriptedNetwork::new(vec![Ok(FetchResponse::new(StatusCode::OK, "css"))]);
        let composer = composer(&storage, network.clone());

        let first = composer.handle(FetchRequest::get("http://origin/site.css")).await.unwrap();
        let second = composer.handle(FetchRequest::get("http://origin/site.css")).await.unwrap();

        assert_eq!(first.source, Source::Network);
        assert_eq!(second.source, Source::Cache);
        assert_eq!(second.response.body, "css");
        assert_eq!(network.calls(), 1);
    }

    #[tokio::test]
    async fn test_repeated_posts_all_reach_network() {
        let network = ScriptedNetwork::new(vec![
            Ok(FetchResponse::new(StatusCode::OK, "order 1")),
            Ok(FetchResponse::new(StatusCode::OK, "order 2")),
        ]);
        let composer = Composer::from_config(
            vec![RouteConfig::new("all", 1, "cache_first")],
            Arc::new(MemoryStorage::default()),
            network.clone(),
        )
        .unwrap();
        let post = |body: &'static str| {
            let mut request = FetchRequest::new(Method::POST, "http://origin/orders");
            request.body = body.into();
            request
        };

        let first = composer.handle(post("item=1")).await.unwrap();
        let second = composer.handle(post("item=2")).await.unwrap();

        assert_eq!(first.response.body, "order 1");
        assert_eq!(second.response.body, "order 2");
        assert_eq!(second.source, Source::Network);
        assert_eq!(network.calls(), 2);
    }

    #[tokio::test]
    async fn test_unknown_strategy_is_synchronous_error() {
        let network = ScriptedNetwork::new(vec![]);
        let composer = Composer::from_config(
            vec![RouteConfig::new("weird", 1, "cache_never")],
            Arc::new(MemoryStorage::default()),
            network.clone(),
        )
        .unwrap();

        let err = composer.intercept(FetchRequest::get("http://origin/")).unwrap_err();
        assert!(matches!(err, ConfigurationError::UnknownStrategy { .. }));

        let err = composer.handle(FetchRequest::get("http://origin/")).await.unwrap_err();
        assert!(matches!(err, ComposeError::Configuration(_)));
        assert_eq!(network.calls(), 0);
    }

    #[test]
    fn test_unknown_strategy_checked_even_with_override() {
        let custom: StrategyOverride = Arc::new(|_: StrategyContext| -> StrategyFuture {
            Box::pin(async { panic!("override must not run for an unknown strategy") })
        });
        let route = Route::compile(RouteConfig::new("odd", 1, "cache_never"))
            .unwrap()
            .with_strategy(custom);
        let composer = Composer::new(
            Router::new(vec![route]),
            Arc::new(MemoryStorage::default()),
            ScriptedNetwork::new(vec![]),
        );

        let err = composer.intercept(FetchRequest::get("http://origin/")).unwrap_err();
        assert!(matches!(err, ConfigurationError::UnknownStrategy { ref kind, .. } if kind == "cache_never"));
    }

    #[tokio::test]
    async fn test_strategy_failure_surfaces() {
        let network = ScriptedNetwork::new(vec![Err(NetworkError::Transport("down".into()))]);
        let composer = composer(&MemoryStorage::default(), network);

        let err = composer.handle(FetchRequest::get("http://origin/api/items")).await.unwrap_err();
        assert!(matches!(err, ComposeError::Strategy(StrategyError::Network(_))));
    }

    #[tokio::test]
    async fn test_activate_removes_orphaned_versions() {
        let storage = MemoryStorage::default();
        storage.open(&PartitionId::new("api", "0")).await.unwrap();
        storage.open(&PartitionId::new("static", "1")).await.unwrap();
        let composer = composer(&storage, ScriptedNetwork::new(vec![]));

        let report = composer.activate().await.unwrap();

        assert_eq!(report.deleted, vec!["api-0"]);
        assert_eq!(storage.keys().await.unwrap(), vec!["static-1"]);
    }
}
