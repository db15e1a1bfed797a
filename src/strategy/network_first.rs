//! Network-first strategy: serve fresh, fall back to the partition.
//!
//! # States
//! ```text
//! FETCHING → STORE_AND_RETURN: status < 400
//! FETCHING → FALLBACK_LOOKUP:  status >= 400, or fetch error
//! FALLBACK_LOOKUP → return:    partition hit
//! FALLBACK_LOOKUP → FAIL:      partition miss
//! ```
//!
//! Non-GET requests run the same machine but never store, and their
//! fallback lookup always misses.
//!
//! On FAIL after an error status the request fails with `NoCachedResponse`;
//! after a fetch error the original network error is returned.

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
        Ok(partition) => fetch_or_fallback(&route, &request, &partition, network.as_ref()).await,
        Err(e) => Err(e.into()),
    };

    if let Err(e) = &result {
        tracing::error!(
            route = %route.name(),
            url = %request.url,
            error = %e,
            "Network-first resolution failed"
        );
        metrics::record_failure(StrategyKind::NetworkFirst.as_str(), e.reason());
    }
    result
}

async fn fetch_or_fallback(
    route: &Route,
    request: &FetchRequest,
    partition: &Arc<dyn Partition>,
    network: &dyn Network,
) -> Result<Served, StrategyError> {
    let partition_id = route.partition().as_str();

    match network.fetch(request.clone()).await {
        Ok(response) if response.is_usable() && !request.is_cacheable() => {
            Ok(Served::network(response))
        }
        Ok(response) if response.is_usable() => {
            run_success_hook(route, &response, partition, request);
            partition.put(request, response.clone()).await?;
            metrics::record_store(partition_id);
            Ok(Served::network(response))
        }
        Ok(response) => {
            tracing::warn!(
                partition = %partition_id,
                url = %request.url,
                status = %response.status,
                "Network returned error status, falling back to cache"
            );
            match fallback(partition_id, request, partition).await? {
                Some(served) => Ok(served),
                None => Err(StrategyError::NoCachedResponse {
                    url: request.url.clone(),
                }),
            }
        }
        Err(e) => {
            tracing::warn!(
                partition = %partition_id,
                url = %request.url,
                error = %e,
                "Network fetch failed, falling back to cache"
            );
            match fallback(partition_id, request, partition).await? {
                Some(served) => Ok(served),
                None => Err(e.into()),
            }
        }
    }
}

async fn fallback(
    partition_id: &str,
    request: &FetchRequest,
    partition: &Arc<dyn Partition>,
) -> Result<Option<Served>, StrategyError> {
    if !request.is_cacheable() {
        return Ok(None);
    }

    let cached = partition.get(request).await?;
    metrics::record_lookup(partition_id, cached.is_some());

    Ok(cached.map(|response| {
        metrics::record_fallback(partition_id);
        tracing::info!(partition = %partition_id, url = %request.url, "Serving cached response");
        Served::fallback(response)
    }))
}
