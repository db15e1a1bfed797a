//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Every route declares a known strategy and a compilable matcher
//! - Validate value ranges (timeouts > 0, upstream URL parses)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ComposerConfig → Result<(), Vec<ValidationError>>

use thiserror::Error;
use url::Url;

use crate::config::schema::{ComposerConfig, MatcherConfig};
use crate::error::ConfigurationError;
use crate::routing::Matcher;
use crate::strategy::StrategyKind;

/// One semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("route #{index} has an empty name")]
    EmptyRouteName { index: usize },

    #[error("route `{route}` has an empty version")]
    EmptyVersion { route: String },

    #[error(transparent)]
    Route(#[from] ConfigurationError),

    #[error("invalid upstream base_url `{url}`: {reason}")]
    InvalidUpstream { url: String, reason: String },

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },
}

pub fn validate_config(config: &ComposerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for (index, route) in config.routes.iter().enumerate() {
        if route.name.trim().is_empty() {
            errors.push(ValidationError::EmptyRouteName { index });
        }
        if route.version.trim().is_empty() {
            errors.push(ValidationError::EmptyVersion {
                route: route.name.clone(),
            });
        }
        if let Err(e) = StrategyKind::parse(&route.name, &route.strategy) {
            errors.push(e.into());
        }
        if let Some(spec @ MatcherConfig::Pattern { .. }) = &route.matcher {
            if let Err(e) = Matcher::compile(&route.name, Some(spec)) {
                errors.push(e.into());
            }
        }
    }

    match Url::parse(&config.upstream.base_url) {
        Ok(url) if url.scheme() == "http" => {}
        Ok(url) => errors.push(ValidationError::InvalidUpstream {
            url: config.upstream.base_url.clone(),
            reason: format!("unsupported scheme `{}`", url.scheme()),
        }),
        Err(e) => errors.push(ValidationError::InvalidUpstream {
            url: config.upstream.base_url.clone(),
            reason: e.to_string(),
        }),
    }

    if config.upstream.timeout_secs == 0 {
        errors.push(ValidationError::Zero {
            field: "upstream.timeout_secs",
        });
    }
    if config.listener.max_body_bytes == 0 {
        errors.push(ValidationError::Zero {
            field: "listener.max_body_bytes",
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
