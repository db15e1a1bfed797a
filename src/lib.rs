//! Declarative request-interception and caching-strategy engine.
//!
//! An ordered list of routes binds URL matchers to caching strategies and
//! versioned storage partitions. Every intercepted request is served by the
//! first matching route's strategy; unmatched requests pass through.

pub mod composer;
pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod network;
pub mod observability;
pub mod routing;
pub mod storage;
pub mod strategy;

pub use composer::{Composer, Interception};
pub use config::schema::{ComposerConfig, RouteConfig};
pub use error::{ComposeError, ConfigurationError, StrategyError};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use network::{FetchRequest, FetchResponse, Network};
pub use storage::{CacheStorage, MemoryStorage, Partition, PartitionId};
pub use strategy::{Served, Source, StrategyKind};
