//! HTTP host adapter.
//!
//! # Data Flow
//! ```text
//! Client request
//!     → server.rs (Axum, request id, trace, timeout)
//!     → request.rs (absolute upstream URL, buffered body → FetchRequest)
//!     → Composer::handle (route → strategy, or passthrough fetch)
//!     → response.rs (status/headers/body + x-cache, or error mapping)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use server::HttpServer;
