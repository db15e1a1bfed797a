//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (reconcile.rs):
//!     Route table → expected partition ids → delete stale partitions
//!     → only then start accepting traffic
//!
//! Shutdown (shutdown.rs):
//!     Ctrl+C → broadcast → stop accepting → save snapshot → exit
//! ```

pub mod reconcile;
pub mod shutdown;

pub use reconcile::{reconcile, ReconcileReport};
pub use shutdown::Shutdown;
