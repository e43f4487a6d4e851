//! Route keys and pattern matching.
//!
//! # Responsibilities
//! - Map HTTP methods onto the two routable methods
//! - Compile and evaluate pattern routes
//! - Build the labels latency records are keyed by
//!
//! # Design Decisions
//! - Patterns are unanchored, like any regex search; anchor with `^...$`
//! - Capture groups that did not participate yield empty strings so the
//!   captures stay positional

use std::fmt;
use std::sync::Arc;

use axum::http::Method;
use regex::Regex;

use crate::error::{TransportError, TransportResult};
use crate::observability::LatencyRecord;
use crate::routing::handler::BoxHandler;

/// The methods the registry routes. Everything else is "not found".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteMethod {
    Get,
    Post,
}

impl RouteMethod {
    pub fn from_http(method: &Method) -> Option<Self> {
        if *method == Method::GET {
            Some(RouteMethod::Get)
        } else if *method == Method::POST {
            Some(RouteMethod::Post)
        } else {
            None
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RouteMethod::Get => "GET",
            RouteMethod::Post => "POST",
        }
    }

    /// Latency label for a route key: `[GET] /path`.
    pub fn label(self, key: &str) -> String {
        format!("[{}] {}", self.as_str(), key)
    }
}

impl fmt::Display for RouteMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered route: handler plus the latency record it reports to.
#[derive(Clone)]
pub struct RouteEntry {
    pub(crate) handler: BoxHandler,
    pub(crate) record: Arc<LatencyRecord>,
    pub(crate) label: String,
}

impl fmt::Debug for RouteEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteEntry")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// A route keyed by a compiled regular expression over the path.
#[derive(Debug, Clone)]
pub struct PatternRoute {
    regex: Regex,
    pub(crate) entry: RouteEntry,
}

impl PatternRoute {
    /// Compile `pattern`, failing with [`TransportError::PatternCompile`].
    pub fn compile(pattern: &str) -> TransportResult<Regex> {
        Regex::new(pattern).map_err(|source| TransportError::PatternCompile {
            pattern: pattern.to_string(),
            source,
        })
    }

    pub(crate) fn new(regex: Regex, entry: RouteEntry) -> Self {
        Self { regex, entry }
    }

    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    /// Captured groups, left to right, if `path` matches.
    pub fn captures(&self, path: &str) -> Option<Vec<String>> {
        let caps = self.regex.captures(path)?;
        Some(
            caps.iter()
                .skip(1)
                .map(|m| m.map(|m| m.as_str().to_string()).unwrap_or_default())
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::RequestContext;

    fn entry() -> RouteEntry {
        RouteEntry {
            handler: Arc::new(|_ctx: RequestContext| async { "ok" }),
            record: Arc::new(LatencyRecord::new()),
            label: String::new(),
        }
    }

    #[test]
    fn test_method_mapping() {
        assert_eq!(RouteMethod::from_http(&Method::GET), Some(RouteMethod::Get));
        assert_eq!(RouteMethod::from_http(&Method::POST), Some(RouteMethod::Post));
        assert_eq!(RouteMethod::from_http(&Method::PUT), None);
        assert_eq!(RouteMethod::Post.label("/x"), "[POST] /x");
    }

    #[test]
    fn test_captures_in_order() {
        let route = PatternRoute::new(
            PatternRoute::compile(r"^/accounts/([0-9]+)/(\w+)/$").unwrap(),
            entry(),
        );
        assert_eq!(
            route.captures("/accounts/42/suggest/"),
            Some(vec!["42".to_string(), "suggest".to_string()])
        );
        assert_eq!(route.captures("/accounts/x/suggest/"), None);
    }

    #[test]
    fn test_optional_group_is_empty() {
        let route = PatternRoute::new(PatternRoute::compile(r"^/a(/(\d+))?$").unwrap(), entry());
        assert_eq!(
            route.captures("/a"),
            Some(vec![String::new(), String::new()])
        );
    }

    #[test]
    fn test_bad_pattern() {
        let err = PatternRoute::compile("([").unwrap_err();
        assert!(matches!(err, TransportError::PatternCompile { .. }));
    }
}
