//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Strategies, reconciliation and the HTTP host produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```

pub mod logging;
pub mod metrics;
