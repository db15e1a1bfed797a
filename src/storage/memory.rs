//! In-memory partition storage with optional JSON snapshot persistence.

use async_trait::async_trait;
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{CacheStorage, Partition, PartitionId, StoreError};
use crate::network::{FetchRequest, FetchResponse};

/// One partition: request key -> response.
#[derive(Default)]
pub struct MemoryPartition {
    entries: DashMap<String, FetchResponse>,
}

#[async_trait]
impl Partition for MemoryPartition {
    async fn get(&self, request: &FetchRequest) -> Result<Option<FetchResponse>, StoreError> {
        Ok(self
            .entries
            .get(&request.cache_key())
            .map(|r| r.value().clone()))
    }

    async fn put(&self, request: &FetchRequest, response: FetchResponse) -> Result<(), StoreError> {
        self.entries.insert(request.cache_key(), response);
        Ok(())
    }

    async fn entry_count(&self) -> Result<usize, StoreError> {
        Ok(self.entries.len())
    }
}

/// A thread-safe set of named partitions.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    partitions: Arc<DashMap<String, Arc<MemoryPartition>>>,
    snapshot_path: Option<PathBuf>,
}

#[derive(Serialize, Deserialize)]
struct SnapshotEntry {
    status: u16,
    /// Header names with base64 encoded values, so opaque bytes survive.
    headers: Vec<(String, String)>,
    /// Base64 encoded body.
    body: String,
}

type Snapshot = BTreeMap<String, BTreeMap<String, SnapshotEntry>>;

impl MemoryStorage {
    /// Create a new empty store.
    pub fn new(snapshot_path: Option<PathBuf>) -> Self {
        Self {
            partitions: Arc::new(DashMap::new()),
            snapshot_path,
        }
    }

    /// Load from a snapshot file if it exists. The path is remembered for `save_to_file`.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let storage = Self::new(Some(path.to_path_buf()));
        if !path.exists() {
            return Ok(storage);
        }

        let reader = BufReader::new(File::open(path)?);
        let snapshot: Snapshot = serde_json::from_reader(reader)?;

        let mut entries = 0;
        for (id, stored) in snapshot {
            let partition = Arc::new(MemoryPartition::default());
            for (key, entry) in stored {
                partition.entries.insert(key, decode_entry(entry)?);
                entries += 1;
            }
            storage.partitions.insert(id, partition);
        }

        tracing::info!(
            partitions = storage.partitions.len(),
            entries,
            path = %path.display(),
            "Loaded cache partitions from snapshot"
        );
        Ok(storage)
    }

    /// Write every partition to the snapshot file, if one is configured.
    pub fn save_to_file(&self) -> Result<(), StoreError> {
        let Some(path) = &self.snapshot_path else {
            return Ok(());
        };

        let snapshot: Snapshot = self
            .partitions
            .iter()
            .map(|p| {
                let entries = p
                    .value()
                    .entries
                    .iter()
                    .map(|e| (e.key().clone(), encode_entry(e.value())))
                    .collect();
                (p.key().clone(), entries)
            })
            .collect();

        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(writer, &snapshot)?;
        tracing::info!(
            partitions = snapshot.len(),
            path = %path.display(),
            "Saved cache partitions to snapshot"
        );
        Ok(())
    }
}

#[async_trait]
impl CacheStorage for MemoryStorage {
    async fn open(&self, id: &PartitionId) -> Result<Arc<dyn Partition>, StoreError> {
        let partition: Arc<dyn Partition> = self
            .partitions
            .entry(id.as_str().to_string())
            .or_default()
            .value()
            .clone();
        Ok(partition)
    }

    async fn keys(&self) -> Result<Vec<String>, StoreError> {
        let mut keys: Vec<String> = self.partitions.iter().map(|r| r.key().clone()).collect();
        keys.sort();
        Ok(keys)
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self.partitions.remove(id).is_some())
    }
}

fn encode_entry(response: &FetchResponse) -> SnapshotEntry {
    SnapshotEntry {
        status: response.status.as_u16(),
        headers: response
            .headers
            .iter()
            .map(|(k, v)| (k.to_string(), STANDARD.encode(v.as_bytes())))
            .collect(),
        body: STANDARD.encode(&response.body),
    }
}

fn decode_entry(entry: SnapshotEntry) -> Result<FetchResponse, StoreError> {
    let status = StatusCode::from_u16(entry.status)
        .map_err(|_| StoreError::Corrupt(format!("invalid status {}", entry.status)))?;

    let mut headers = HeaderMap::new();
    for (name, value) in entry.headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;
        let value = STANDARD
            .decode(value)
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;
        let value = HeaderValue::from_bytes(&value).map_err(|e| StoreError::Corrupt(e.to_string()))?;
        headers.append(name, value);
    }

    let body = STANDARD
        .decode(entry.body)
        .map_err(|e| StoreError::Corrupt(e.to_string()))?;

    Ok(FetchResponse {
        status,
        headers,
        body: body.into(),
    })
}
