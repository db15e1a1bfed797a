//! URL matching logic.
//!
//! # Responsibilities
//! - Accept every URL when no matcher is configured
//! - Match a literal prefix anchored at index 0
//! - Match a regular expression anywhere in the full URL
//! - Delegate to a caller-supplied predicate when one is installed
//!
//! # Design Decisions
//! - Prefix matching is case-sensitive and never a substring search
//! - Patterns are compiled once at startup; an invalid pattern is a
//!   configuration error, not a silent non-match

use regex::Regex;
use std::fmt;
use std::sync::Arc;

use crate::config::MatcherConfig;
use crate::error::ConfigurationError;

/// Caller-supplied URL predicate.
pub type MatcherFn = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// A compiled URL matcher.
#[derive(Clone)]
pub enum Matcher {
    /// Matches everything (catch-all route).
    Any,
    /// Matches URLs starting with the literal.
    Prefix(String),
    /// Matches URLs the expression finds a match in.
    Pattern(Regex),
    /// Matches URLs the predicate accepts.
    Custom(MatcherFn),
}

impl Matcher {
    /// Compile a matcher specification for the route named `route`.
    pub fn compile(route: &str, spec: Option<&MatcherConfig>) -> Result<Self, ConfigurationError> {
        match spec {
            None => Ok(Matcher::Any),
            // An empty literal is falsy: treat it as absent.
            Some(MatcherConfig::Prefix(prefix)) if prefix.is_empty() => Ok(Matcher::Any),
            Some(MatcherConfig::Prefix(prefix)) => Ok(Matcher::Prefix(prefix.clone())),
            Some(MatcherConfig::Pattern { pattern }) => Regex::new(pattern)
                .map(Matcher::Pattern)
                .map_err(|e| ConfigurationError::InvalidPattern {
                    route: route.to_string(),
                    reason: e.to_string(),
                }),
        }
    }

    /// Returns true if `url` is accepted by this matcher.
    pub fn matches(&self, url: &str) -> bool {
        match self {
            Matcher::Any => true,
            Matcher::Prefix(prefix) => url.starts_with(prefix.as_str()),
            Matcher::Pattern(regex) => regex.is_match(url),
            Matcher::Custom(predicate) => predicate(url),
        }
    }
}

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Matcher::Any => f.write_str("Any"),
            Matcher::Prefix(prefix) => f.debug_tuple("Prefix").field(prefix).finish(),
            Matcher::Pattern(regex) => f.debug_tuple("Pattern").field(&regex.as_str()).finish(),
            Matcher::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}
