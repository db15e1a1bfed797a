//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the composer.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Deserializer, Serialize};

/// Root configuration for the caching service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ComposerConfig {
    /// Listener configuration (bind address, body limits).
    pub listener: ListenerConfig,

    /// Upstream origin that intercepted requests are fetched from.
    pub upstream: UpstreamConfig,

    /// Partition storage settings.
    pub storage: StorageConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Ordered route definitions. First match wins.
    pub routes: Vec<RouteConfig>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum request/response body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_body_bytes: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Upstream origin configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL joined with the incoming path and query (e.g., "http://127.0.0.1:3000").
    pub base_url: String,

    /// Total time allowed for one upstream fetch, in seconds.
    pub timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3000".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Partition storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON snapshot file. Partitions are loaded from it on startup and
    /// written back on shutdown. `None` keeps everything in memory.
    pub snapshot_path: Option<String>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// One route: a URL matcher bound to a caching strategy and a versioned partition.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Partition name, combined with `version` into the partition identifier.
    pub name: String,

    /// Partition version. Bumping it orphans the old partition.
    #[serde(deserialize_with = "deserialize_version")]
    pub version: String,

    /// Declared strategy type, e.g. "cache_first" or "network_first".
    pub strategy: String,

    /// URL matcher. Absent matches every URL.
    #[serde(default)]
    pub matcher: Option<MatcherConfig>,
}

impl RouteConfig {
    pub fn new(
        name: impl Into<String>,
        version: impl ToString,
        strategy: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.to_string(),
            strategy: strategy.into(),
            matcher: None,
        }
    }

    /// Match URLs starting with `prefix`.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.matcher = Some(MatcherConfig::Prefix(prefix.into()));
        self
    }

    /// Match URLs the regular expression `pattern` tests positively against.
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.matcher = Some(MatcherConfig::Pattern {
            pattern: pattern.into(),
        });
        self
    }
}

/// Matcher specification as written in the config file.
///
/// ```toml
/// matcher = "http://origin/api/"          # literal prefix
/// matcher = { pattern = "\\.(png|css)$" }  # regular expression
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum MatcherConfig {
    Prefix(String),
    Pattern { pattern: String },
}

/// Versions may be written as TOML strings or integers.
fn deserialize_version<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Version {
        Text(String),
        Int(i64),
    }

    Ok(match Version::deserialize(deserializer)? {
        Version::Text(s) => s,
        Version::Int(n) => n.to_string(),
    })
}
