//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ComposerConfig (validated, immutable)
//!     → routes compiled into the Router once at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable for the process lifetime
//! - All fields except routes have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::ComposerConfig;
pub use schema::ListenerConfig;
pub use schema::MatcherConfig;
pub use schema::ObservabilityConfig;
pub use schema::RouteConfig;
pub use schema::StorageConfig;
pub use schema::UpstreamConfig;
