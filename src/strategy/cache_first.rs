//! Cache-first strategy: serve from the partition, populate it on miss.
//!
//! ```text
//! non-GET → fetch → return (partition untouched)
//! open partition → lookup
//!     hit  → return stored entry (no fetch)
//!     miss → fetch
//!         2xx    → hook → store copy → return
//!         other  → return without storing
//!         error  → fail
//! ```

use std::sync::Arc;

use super::{run_success_hook, Served, StrategyContext, StrategyKind};
use crate::error::StrategyError;
use crate::network::{FetchRequest, Network};
use crate::observability::metrics;
use crate::routing::Route;
use crate::storage::Partition;

pub async fn execute(ctx: StrategyContext) -> Result<Served, StrategyError> {
    let StrategyContext {
        route,
        request,
        storage,
        network,
    } = ctx;

    let result = match storage.open(route.partition()).await {
        Ok(partition) => read_through(&route, &request, &partition, network.as_ref()).await,
        Err(e) => Err(e.into()),
    };

    if let Err(e) = &result {
        tracing::error!(
            route = %route.name(),
            url = %request.url,
            error = %e,
            "Read-through caching failed"
        );
        metrics::record_failure(StrategyKind::CacheFirst.as_str(), e.reason());
    }
    result
}

async fn read_through(
    route: &Route,
    request: &FetchRequest,
    partition: &Arc<dyn Partition>,
    network: &dyn Network,
) -> Result<Served, StrategyError> {
    let partition_id = route.partition().as_str();

    if !request.is_cacheable() {
        tracing::debug!(method = %request.method, url = %request.url, "Method not cacheable, fetching");
        let response = network.fetch(request.clone()).await?;
        return Ok(Served::network(response));
    }

    if let Some(cached) = partition.get(request).await? {
        tracing::debug!(partition = %partition_id, url = %request.url, "Found response in cache");
        metrics::record_lookup(partition_id, true);
        return Ok(Served::cache(cached));
    }

    metrics::record_lookup(partition_id, false);
    tracing::debug!(
        partition = %partition_id,
        url = %request.url,
        "No cached response, fetching from network"
    );

    let response = network.fetch(request.clone()).await?;
    tracing::debug!(url = %request.url, status = %response.status, "Network response");

    if response.is_usable() && response.ok() {
        run_success_hook(route, &response, partition, request);
        partition.put(request, response.clone()).await?;
        metrics::record_store(partition_id);
    } else {
        tracing::debug!(
            url = %request.url,
            status = %response.status,
            "Not caching non-success response"
        );
    }

    Ok(Served::network(response))
}
