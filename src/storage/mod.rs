//! Partition storage subsystem.
//!
//! # Data Flow
//! ```text
//! RouteConfig (name, version)
//!     → PartitionId "name-version"
//!     → CacheStorage::open → Partition handle
//!     → Partition::get / Partition::put keyed by FetchRequest::cache_key
//!
//! Startup:
//!     CacheStorage::keys → reconcile → CacheStorage::delete (stale ids)
//! ```
//!
//! # Design Decisions
//! - Partitions are opened lazily and never closed explicitly
//! - No expiry or eviction inside a partition; whole partitions are deleted
//! - Concurrent puts to one key are last-write-wins
//! - `put` takes the response by value; callers that also return it must clone first

pub mod memory;

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::config::RouteConfig;
use crate::network::{FetchRequest, FetchResponse};

pub use memory::MemoryStorage;

/// Identifier of a storage partition: `name-version`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PartitionId(String);

impl PartitionId {
    pub fn new(name: &str, version: &str) -> Self {
        Self(format!("{}-{}", name, version))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&RouteConfig> for PartitionId {
    fn from(config: &RouteConfig) -> Self {
        Self::new(&config.name, &config.version)
    }
}

impl fmt::Display for PartitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Error type for storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("partition `{0}` is unavailable")]
    Unavailable(String),

    #[error("snapshot io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot encoding error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("corrupt snapshot entry: {0}")]
    Corrupt(String),
}

/// An isolated key-value area holding responses keyed by request identity.
#[async_trait]
pub trait Partition: Send + Sync {
    async fn get(&self, request: &FetchRequest) -> Result<Option<FetchResponse>, StoreError>;

    /// Store `response` under the identity of `request`, replacing any previous entry.
    ///
    /// The partition takes ownership of `response`. A caller that still needs the
    /// response afterwards must pass a clone.
    async fn put(&self, request: &FetchRequest, response: FetchResponse) -> Result<(), StoreError>;

    /// Number of stored entries.
    async fn entry_count(&self) -> Result<usize, StoreError>;
}

/// Opens, lists and deletes named partitions.
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Open a partition, creating it empty if it does not exist.
    async fn open(&self, id: &PartitionId) -> Result<Arc<dyn Partition>, StoreError>;

    /// Identifiers of every existing partition.
    async fn keys(&self) -> Result<Vec<String>, StoreError>;

    /// Delete a partition. Returns true when it existed.
    async fn delete(&self, id: &str) -> Result<bool, StoreError>;
}
