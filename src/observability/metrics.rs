//! Metrics collection and exposition.
//!
//! # Metrics
//! - `cache_lookups_total` (counter): partition lookups by partition, result
//! - `cache_stores_total` (counter): responses written by partition
//! - `cache_fallbacks_total` (counter): stale entries served by partition
//! - `strategy_failures_total` (counter): failed resolutions by strategy, reason
//! - `strategy_duration_seconds` (histogram): time to produce a response
//! - `partitions_deleted_total` (counter): reconciliation deletions by result

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_lookup(partition: &str, hit: bool) {
    let result = if hit { "hit" } else { "miss" };
    counter!("cache_lookups_total", "partition" => partition.to_string(), "result" => result)
        .increment(1);
}

pub fn record_store(partition: &str) {
    counter!("cache_stores_total", "partition" => partition.to_string()).increment(1);
}

pub fn record_fallback(partition: &str) {
    counter!("cache_fallbacks_total", "partition" => partition.to_string()).increment(1);
}

pub fn record_failure(strategy: &str, reason: &'static str) {
    counter!("strategy_failures_total", "strategy" => strategy.to_string(), "reason" => reason)
        .increment(1);
}

pub fn record_strategy_duration(strategy: &str, start: Instant) {
    histogram!("strategy_duration_seconds", "strategy" => strategy.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_partition_deleted(result: &'static str) {
    counter!("partitions_deleted_total", "result" => result).increment(1);
}
