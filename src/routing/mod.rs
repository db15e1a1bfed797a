//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Intercepted request (absolute URL)
//!     → router.rs (ordered route scan)
//!     → matcher.rs (absent / prefix / pattern / custom)
//!     → Return: first matching Route or None (pass through)
//!
//! Route Compilation (at startup):
//!     RouteConfig[]
//!     → Compile matchers (regex compiled once)
//!     → Freeze as immutable Router
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Deterministic: same input always matches same route
//! - First match wins (declaration order)

pub mod matcher;
pub mod router;

pub use matcher::{Matcher, MatcherFn};
pub use router::{Route, Router};
