//! Error taxonomy shared by the routing and strategy layers.

use thiserror::Error;

use crate::network::NetworkError;
use crate::storage::StoreError;

/// A route is declared in a way the engine cannot execute.
///
/// Raised synchronously while resolving a request, never swallowed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("route `{route}` declares unknown strategy type `{kind}`")]
    UnknownStrategy { route: String, kind: String },

    #[error("route `{route}` has an invalid matcher pattern: {reason}")]
    InvalidPattern { route: String, reason: String },
}

/// Failure of a strategy to produce a response for one request.
#[derive(Debug, Error)]
pub enum StrategyError {
    #[error("network fetch failed: {0}")]
    Network(#[from] NetworkError),

    #[error("no cached response for {url}")]
    NoCachedResponse { url: String },

    #[error("cache storage failed: {0}")]
    Store(#[from] StoreError),
}

impl StrategyError {
    /// Short label used for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            StrategyError::Network(_) => "network",
            StrategyError::NoCachedResponse { .. } => "no_cached_response",
            StrategyError::Store(_) => "store",
        }
    }
}

/// Failure of the engine to handle an intercepted request.
#[derive(Debug, Error)]
pub enum ComposeError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Strategy(#[from] StrategyError),
}
