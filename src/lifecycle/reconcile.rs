//! Partition reconciliation at startup.
//!
//! # Responsibilities
//! - Compute the expected partition ids from the route table
//! - Delete every stored partition that is not expected
//! - Report what was kept, deleted and what failed
//!
//! # Design Decisions
//! - Deletions run concurrently and independently; one failure never
//!   prevents the others from being attempted
//! - A failed deletion is logged, not fatal; the partition is retried on
//!   the next startup
//! - Callers await the whole join before serving traffic

use futures_util::future::join_all;
use std::collections::BTreeSet;

use crate::observability::metrics;
use crate::storage::{CacheStorage, StoreError};

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Existing partitions that are still expected.
    pub kept: Vec<String>,
    /// Partitions deleted in this pass.
    pub deleted: Vec<String>,
    /// Partitions whose deletion failed.
    pub failed: Vec<String>,
}

/// Delete every partition in `storage` that is not in `expected`.
///
/// Fails only when the partition listing itself cannot be read.
pub async fn reconcile(
    storage: &dyn CacheStorage,
    expected: &BTreeSet<String>,
) -> Result<ReconcileReport, StoreError> {
    let existing = storage.keys().await?;

    let (kept, stale): (Vec<String>, Vec<String>) =
        existing.into_iter().partition(|id| expected.contains(id));

    let outcomes = join_all(stale.into_iter().map(|id| async move {
        tracing::info!(partition = %id, "Deleting out of date cache partition");
        let outcome = storage.delete(&id).await;
        (id, outcome)
    }))
    .await;

    let mut report = ReconcileReport {
        kept,
        ..Default::default()
    };

    for (id, outcome) in outcomes {
        match outcome {
            Ok(_) => {
                metrics::record_partition_deleted("ok");
                report.deleted.push(id);
            }
            Err(e) => {
                tracing::error!(partition = %id, error = %e, "Failed to delete cache partition");
                metrics::record_partition_deleted("error");
                report.failed.push(id);
            }
        }
    }

    tracing::info!(
        kept = report.kept.len(),
        deleted = report.deleted.len(),
        failed = report.failed.len(),
        "Cache partitions reconciled"
    );
    Ok(report)
}
