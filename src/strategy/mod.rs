//! Strategy executor.
//!
//! # Data Flow
//! ```text
//! StrategyContext (route, request, storage, network)
//!     → dispatch: custom override, or StrategyKind → built-in strategy
//!     → cache_first.rs   (partition hit → return; miss → fetch → store ok)
//!     → network_first.rs (fetch → store usable; unusable → partition fallback)
//!     → Served (response + where it came from) or StrategyError
//! ```
//!
//! # Design Decisions
//! - Closed set of strategy kinds; unknown declared types are a
//!   `ConfigurationError` raised before any I/O
//! - Steps within one request are strictly sequential
//! - No locking: concurrent requests may interleave writes to one partition
//! - Failures are logged and returned; no synthetic responses

pub mod cache_first;
pub mod network_first;

use futures_util::future::BoxFuture;
use std::fmt;
use std::sync::Arc;

use crate::config::RouteConfig;
use crate::error::{ConfigurationError, StrategyError};
use crate::network::{FetchRequest, FetchResponse, Network};
use crate::routing::Route;
use crate::storage::{CacheStorage, Partition};

/// Hook invoked with (response, partition, request, route config) after a
/// successful fetch and before the response is stored.
pub type SuccessHook =
    Arc<dyn Fn(&FetchResponse, &Arc<dyn Partition>, &FetchRequest, &RouteConfig) + Send + Sync>;

/// Pending strategy result.
pub type StrategyFuture = BoxFuture<'static, Result<Served, StrategyError>>;

/// Replacement for the built-in strategy of a route.
pub type StrategyOverride = Arc<dyn Fn(StrategyContext) -> StrategyFuture + Send + Sync>;

/// Built-in caching strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    /// Serve from the partition, populate it on miss.
    CacheFirst,
    /// Serve fresh from the network, fall back to the partition.
    NetworkFirst,
}

impl StrategyKind {
    /// Parse a declared strategy type for the route named `route`.
    ///
    /// Case-insensitive; `-` and `_` are interchangeable. Legacy names
    /// `cache_always` / `cache_offline` and the numeric ids `1` / `2` are accepted.
    pub fn parse(route: &str, declared: &str) -> Result<Self, ConfigurationError> {
        let normalized = declared.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "cache_first" | "cache_always" | "1" => Ok(StrategyKind::CacheFirst),
            "network_first" | "cache_offline" | "2" => Ok(StrategyKind::NetworkFirst),
            _ => Err(ConfigurationError::UnknownStrategy {
                route: route.to_string(),
                kind: declared.to_string(),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::CacheFirst => "cache_first",
            StrategyKind::NetworkFirst => "network_first",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a served response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// Partition hit, no network call.
    Cache,
    /// Fresh network response.
    Network,
    /// Partition entry served because the network was unusable.
    Fallback,
    /// No route matched; fetched straight from the network.
    Bypass,
}

impl Source {
    /// Value of the `x-cache` response header.
    pub fn as_header(&self) -> &'static str {
        match self {
            Source::Cache => "hit",
            Source::Network => "miss",
            Source::Fallback => "fallback",
            Source::Bypass => "bypass",
        }
    }
}

/// A response produced by a strategy.
#[derive(Debug, Clone)]
pub struct Served {
    pub response: FetchResponse,
    pub source: Source,
}

impl Served {
    pub fn cache(response: FetchResponse) -> Self {
        Self { response, source: Source::Cache }
    }

    pub fn network(response: FetchResponse) -> Self {
        Self { response, source: Source::Network }
    }

    pub fn fallback(response: FetchResponse) -> Self {
        Self { response, source: Source::Fallback }
    }

    pub fn bypass(response: FetchResponse) -> Self {
        Self { response, source: Source::Bypass }
    }
}

/// Everything a strategy needs to serve one request.
#[derive(Clone)]
pub struct StrategyContext {
    pub route: Arc<Route>,
    pub request: FetchRequest,
    pub storage: Arc<dyn CacheStorage>,
    pub network: Arc<dyn Network>,
}

/// Start the strategy for the context's route.
///
/// `kind` is the route's already parsed declared type. Callers parse it even
/// when an override is installed, so a misconfigured route fails the same way
/// with or without hooks.
pub fn dispatch(kind: StrategyKind, ctx: StrategyContext) -> StrategyFuture {
    if let Some(custom) = ctx.route.strategy_override().cloned() {
        tracing::debug!(route = %ctx.route.name(), "Running custom strategy");
        return custom(ctx);
    }

    match kind {
        StrategyKind::CacheFirst => Box::pin(cache_first::execute(ctx)),
        StrategyKind::NetworkFirst => Box::pin(network_first::execute(ctx)),
    }
}

/// Invoke the route's success hook, if any.
pub(crate) fn run_success_hook(
    route: &Route,
    response: &FetchResponse,
    partition: &Arc<dyn Partition>,
    request: &FetchRequest,
) {
    if let Some(hook) = route.success_hook() {
        hook(response, partition, request, route.config());
    }
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use crate::network::NetworkError;
    use crate::storage::MemoryStorage;
    use axum::http::StatusCode;

    #[test]
    fn test_parse_kinds() {
        assert_eq!(StrategyKind::parse("r", "cache_first").unwrap(), StrategyKind::CacheFirst);
        assert_eq!(StrategyKind::parse("r", "CACHE_ALWAYS").unwrap(), StrategyKind::CacheFirst);
        assert_eq!(StrategyKind::parse("r", "network-first").unwrap(), StrategyKind::NetworkFirst);
        assert_eq!(StrategyKind::parse("r", "CACHE_OFFLINE").unwrap(), StrategyKind::NetworkFirst);
        assert_eq!(StrategyKind::parse("r", "2").unwrap(), StrategyKind::NetworkFirst);
        assert!(StrategyKind::parse("r", "stale_while_revalidate").is_err());
    }

    #[tokio::test]
    async fn test_dispatch_selects_built_in_strategy() {
        let storage = MemoryStorage::default();
        let network = ScriptedNetwork::new(vec![Err(NetworkError::Transport("offline".into()))]);
        let route = Route::compile(RouteConfig::new("r", 1, "network_first")).unwrap();
        let ctx = context(route, FetchRequest::get("/feed"), &storage, network.clone());

        let err = dispatch(StrategyKind::NetworkFirst, ctx).await.unwrap_err();
        assert!(matches!(err, StrategyError::Network(NetworkError::Transport(_))));
        assert_eq!(network.calls(), 1);
    }

    #[tokio::test]
    async fn test_dispatch_runs_override() {
        let network = ScriptedNetwork::new(vec![]);
        let custom: StrategyOverride = Arc::new(|ctx: StrategyContext| -> StrategyFuture {
            Box::pin(async move {
                Ok(Served::network(FetchResponse::new(
                    StatusCode::OK,
                    format!("custom:{}", ctx.request.url),
                )))
            })
        });
        let route = Route::compile(RouteConfig::new("c", 1, "cache_first"))
            .unwrap()
            .with_strategy(custom);
        let ctx = context(route, FetchRequest::get("/page"), &MemoryStorage::default(), network.clone());

        let served = dispatch(StrategyKind::CacheFirst, ctx).await.unwrap();
        assert_eq!(served.response.body, "custom:/page");
        assert_eq!(network.calls(), 0);
    }
}
