//! Route lookup.
//!
//! # Responsibilities
//! - Store compiled routes in declaration order
//! - Look up the first route whose matcher accepts a URL
//! - Return the matched route or an explicit no-match
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) scan in declaration order; later routes are never evaluated once
//!   an earlier one matches
//! - Routes carry their optional hooks, absent hooks mean default behaviour

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::config::RouteConfig;
use crate::error::ConfigurationError;
use crate::routing::matcher::{Matcher, MatcherFn};
use crate::storage::PartitionId;
use crate::strategy::{StrategyKind, StrategyOverride, SuccessHook};

/// A compiled route.
#[derive(Clone)]
pub struct Route {
    config: RouteConfig,
    partition: PartitionId,
    matcher: Matcher,
    on_success: Option<SuccessHook>,
    strategy: Option<StrategyOverride>,
}

impl Route {
    /// Compile a route from its configuration.
    pub fn compile(config: RouteConfig) -> Result<Self, ConfigurationError> {
        let matcher = Matcher::compile(&config.name, config.matcher.as_ref())?;
        Ok(Self {
            partition: PartitionId::from(&config),
            matcher,
            config,
            on_success: None,
            strategy: None,
        })
    }

    /// Replace the configured matcher with a predicate.
    pub fn with_matcher_fn(mut self, predicate: MatcherFn) -> Self {
        self.matcher = Matcher::Custom(predicate);
        self
    }

    /// Install a hook that runs after a successful fetch, before the response is stored.
    pub fn with_success_hook(mut self, hook: SuccessHook) -> Self {
        self.on_success = Some(hook);
        self
    }

    /// Run `strategy` instead of the built-in strategy for the declared type.
    pub fn with_strategy(mut self, strategy: StrategyOverride) -> Self {
        self.strategy = Some(strategy);
        self
    }

    pub fn config(&self) -> &RouteConfig {
        &self.config
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn partition(&self) -> &PartitionId {
        &self.partition
    }

    pub fn matches(&self, url: &str) -> bool {
        self.matcher.matches(url)
    }

    /// Parse the declared strategy type.
    pub fn kind(&self) -> Result<StrategyKind, ConfigurationError> {
        StrategyKind::parse(&self.config.name, &self.config.strategy)
    }

    pub fn success_hook(&self) -> Option<&SuccessHook> {
        self.on_success.as_ref()
    }

    pub fn strategy_override(&self) -> Option<&StrategyOverride> {
        self.strategy.as_ref()
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("name", &self.config.name)
            .field("partition", &self.partition)
            .field("strategy", &self.config.strategy)
            .field("matcher", &self.matcher)
            .field("on_success", &self.on_success.is_some())
            .field("strategy_override", &self.strategy.is_some())
            .finish()
    }
}

/// Ordered, immutable route table.
#[derive(Debug, Clone, Default)]
pub struct Router {
    routes: Vec<Arc<Route>>,
}

impl Router {
    pub fn new(routes: Vec<Route>) -> Self {
        Self {
            routes: routes.into_iter().map(Arc::new).collect(),
        }
    }

    /// Compile every route configuration, preserving order.
    pub fn from_config(configs: Vec<RouteConfig>) -> Result<Self, ConfigurationError> {
        let routes = configs
            .into_iter()
            .map(Route::compile)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(routes))
    }

    /// First route whose matcher accepts `url`.
    pub fn resolve(&self, url: &str) -> Option<&Arc<Route>> {
        self.routes.iter().find(|route| route.matches(url))
    }

    pub fn routes(&self) -> &[Arc<Route>] {
        &self.routes
    }

    /// Partition identifiers the current routes expect to exist. Duplicates collapse.
    pub fn expected_partitions(&self) -> BTreeSet<String> {
        self.routes
            .iter()
            .map(|route| route.partition().as_str().to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn router() -> Router {
        Router::from_config(vec![
            RouteConfig::new("api", 1, "network_first").with_prefix("http://origin/api/"),
            RouteConfig::new("images", 2, "cache_first").with_pattern(r"\.png$"),
            RouteConfig::new("fallback", 1, "network_first"),
        ])
        .unwrap()
    }

    #[test]
    fn test_first_match_wins() {
        let router = router();

        // Matches both "api" and "images"; "api" is declared first.
        let route = router.resolve("http://origin/api/chart.png").unwrap();
        assert_eq!(route.name(), "api");

        let route = router.resolve("http://origin/static/logo.png").unwrap();
        assert_eq!(route.name(), "images");

        let route = router.resolve("http://origin/index.html").unwrap();
        assert_eq!(route.name(), "fallback");
    }

    #[test]
    fn test_no_match() {
        let router = Router::from_config(vec![
            RouteConfig::new("api", 1, "network_first").with_prefix("/api/"),
        ])
        .unwrap();
        assert!(router.resolve("/v2/api/").is_none());
        assert!(Router::default().resolve("/anything").is_none());
    }

    #[test]
    fn test_expected_partitions_collapse_duplicates() {
        let router = Router::from_config(vec![
            RouteConfig::new("a", 1, "cache_first").with_prefix("/a"),
            RouteConfig::new("a", 1, "network_first").with_prefix("/b"),
            RouteConfig::new("c", 3, "cache_first"),
        ])
        .unwrap();
        let expected: Vec<_> = router.expected_partitions().into_iter().collect();
        assert_eq!(expected, vec!["a-1", "c-3"]);
    }

    #[test]
    fn test_custom_matcher_overrides_config() {
        let route = Route::compile(RouteConfig::new("odd", 1, "cache_first").with_prefix("/never"))
            .unwrap()
            .with_matcher_fn(Arc::new(|url: &str| url.ends_with("?fresh=0")));
        let router = Router::new(vec![route]);
        assert!(router.resolve("/page?fresh=0").is_some());
        assert!(router.resolve("/never").is_none());
    }

    #[test]
    fn test_unknown_kind_is_reported_per_route() {
        let router = Router::from_config(vec![RouteConfig::new("bad", 1, "cache_sometimes")]).unwrap();
        let route = router.resolve("/x").unwrap();
        assert_eq!(
            route.kind().unwrap_err(),
            ConfigurationError::UnknownStrategy {
                route: "bad".into(),
                kind: "cache_sometimes".into(),
            }
        );
    }
}
