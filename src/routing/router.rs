//! Route registration and lookup.
//!
//! # Responsibilities
//! - Collect exact and pattern routes per method at startup
//! - Create each route's latency record as it is registered
//! - Resolve method + path to a handler, exact table first
//!
//! # Design Decisions
//! - `RouterBuilder` is consumed by `build`; the resulting `Router` is
//!   immutable and shared by `Arc`, so lookups take no locks
//! - Exact routes: last registration for a path wins
//! - Pattern routes: kept in registration order, first match wins
//! - A pattern that fails to compile is a startup error

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::config::DispatchConfig;
use crate::error::TransportResult;
use crate::http::builtin;
use crate::observability::{LatencyRecord, StatsCollector};
use crate::routing::handler::{BoxHandler, Handler};
use crate::routing::matcher::{PatternRoute, RouteEntry, RouteMethod};

/// Exact and pattern routes for one method.
#[derive(Debug, Default)]
struct RouteTable {
    exact: HashMap<String, RouteEntry>,
    patterns: Vec<PatternRoute>,
}

impl RouteTable {
    fn resolve(&self, path: &str) -> Option<(&RouteEntry, Vec<String>)> {
        if let Some(entry) = self.exact.get(path) {
            return Some((entry, Vec::new()));
        }
        self.patterns
            .iter()
            .find_map(|route| route.captures(path).map(|caps| (&route.entry, caps)))
    }
}

/// A successful lookup.
pub struct Resolution<'a> {
    pub handler: &'a BoxHandler,
    pub record: &'a Arc<LatencyRecord>,
    /// `[GET] /path` or `[GET] <pattern>`.
    pub label: &'a str,
    /// Capture groups; empty for exact routes.
    pub captures: Vec<String>,
}

impl fmt::Debug for Resolution<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolution")
            .field("label", &self.label)
            .field("captures", &self.captures)
            .finish_non_exhaustive()
    }
}

/// Collects routes before traffic starts.
#[derive(Debug)]
pub struct RouterBuilder {
    get: RouteTable,
    post: RouteTable,
    stats: StatsCollector,
}

impl RouterBuilder {
    /// A builder with `GET /ping` and `GET /internal/stats` registered.
    pub fn new() -> Self {
        let builder = Self {
            get: RouteTable::default(),
            post: RouteTable::default(),
            stats: StatsCollector::new(),
        };
        builder
            .get(builtin::PING_PATH, builtin::ping)
            .get(builtin::STATS_PATH, builtin::stats)
    }

    /// Built-in routes as selected by the dispatch config.
    pub fn from_config(config: &DispatchConfig) -> Self {
        let builder = Self::new();
        if config.shutdown_route {
            builder.with_shutdown_route()
        } else {
            builder
        }
    }

    /// Register the token-gated `GET /internal/shutdown`.
    pub fn with_shutdown_route(self) -> Self {
        self.get(builtin::SHUTDOWN_PATH, builtin::shutdown)
    }

    fn table(&mut self, method: RouteMethod) -> &mut RouteTable {
        match method {
            RouteMethod::Get => &mut self.get,
            RouteMethod::Post => &mut self.post,
        }
    }

    fn entry(&mut self, method: RouteMethod, key: &str, handler: BoxHandler) -> RouteEntry {
        let label = method.label(key);
        let record = self.stats.register(label.clone());
        RouteEntry {
            handler,
            record,
            label,
        }
    }

    /// Register an exact route. Replaces any earlier route for the same path.
    pub fn route<H: Handler>(mut self, method: RouteMethod, path: &str, handler: H) -> Self {
        let entry = self.entry(method, path, Arc::new(handler));
        if self.table(method).exact.insert(path.to_string(), entry).is_some() {
            tracing::debug!(method = %method, path = %path, "Route replaced");
        }
        self
    }

    /// Register a pattern route, matched after every exact route.
    pub fn pattern_route<H: Handler>(
        mut self,
        method: RouteMethod,
        pattern: &str,
        handler: H,
    ) -> TransportResult<Self> {
        let regex = PatternRoute::compile(pattern)?;
        let entry = self.entry(method, pattern, Arc::new(handler));
        self.table(method).patterns.push(PatternRoute::new(regex, entry));
        Ok(self)
    }

    pub fn get<H: Handler>(self, path: &str, handler: H) -> Self {
        self.route(RouteMethod::Get, path, handler)
    }

    pub fn post<H: Handler>(self, path: &str, handler: H) -> Self {
        self.route(RouteMethod::Post, path, handler)
    }

    /// e.g. `^/accounts/([0-9]+)/suggest/$`; groups reach the handler as
    /// `ctx.captures`.
    ///
    /// A pattern without capture groups still matches; its handler sees an
    /// empty `ctx.captures`. Patterns are not anchored implicitly.
    pub fn get_pattern<H: Handler>(self, pattern: &str, handler: H) -> TransportResult<Self> {
        self.pattern_route(RouteMethod::Get, pattern, handler)
    }

    /// Same matching rules as [`RouterBuilder::get_pattern`].
    pub fn post_pattern<H: Handler>(self, pattern: &str, handler: H) -> TransportResult<Self> {
        self.pattern_route(RouteMethod::Post, pattern, handler)
    }

    /// Freeze the tables.
    pub fn build(self) -> Router {
        tracing::info!(
            get_routes = self.get.exact.len(),
            get_patterns = self.get.patterns.len(),
            post_routes = self.post.exact.len(),
            post_patterns = self.post.patterns.len(),
            "Routes compiled"
        );
        Router {
            get: self.get,
            post: self.post,
            stats: Arc::new(self.stats),
        }
    }
}

impl Default for RouterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Immutable routing tables plus their latency records.
#[derive(Debug)]
pub struct Router {
    get: RouteTable,
    post: RouteTable,
    stats: Arc<StatsCollector>,
}

impl Router {
    pub fn builder() -> RouterBuilder {
        RouterBuilder::new()
    }

    /// Look up the route for `method` and `path`. Exact routes win.
    pub fn resolve(&self, method: RouteMethod, path: &str) -> Option<Resolution<'_>> {
        let table = match method {
            RouteMethod::Get => &self.get,
            RouteMethod::Post => &self.post,
        };
        table.resolve(path).map(|(entry, captures)| Resolution {
            handler: &entry.handler,
            record: &entry.record,
            label: &entry.label,
            captures,
        })
    }

    pub fn stats(&self) -> &Arc<StatsCollector> {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::RequestContext;

    fn named(name: &'static str) -> impl Handler {
        move |_ctx: RequestContext| async move { name }
    }

    fn label(router: &Router, method: RouteMethod, path: &str) -> Option<String> {
        router.resolve(method, path).map(|r| r.label.to_string())
    }

    #[test]
    fn test_exact_routes() {
        let router = Router::builder()
            .get("/a", named("a"))
            .post("/a", named("a-post"))
            .build();

        assert_eq!(label(&router, RouteMethod::Get, "/a").as_deref(), Some("[GET] /a"));
        assert_eq!(label(&router, RouteMethod::Post, "/a").as_deref(), Some("[POST] /a"));
        assert!(router.resolve(RouteMethod::Get, "/b").is_none());
        assert!(router.resolve(RouteMethod::Post, "/ping").is_none());
    }

    #[test]
    fn test_builtins_registered() {
        let router = Router::builder().build();
        assert!(router.resolve(RouteMethod::Get, "/ping").is_some());
        assert!(router.resolve(RouteMethod::Get, "/internal/stats").is_some());
        assert!(router.resolve(RouteMethod::Get, "/internal/shutdown").is_none());

        let mut config = DispatchConfig::default();
        config.shutdown_route = true;
        let router = RouterBuilder::from_config(&config).build();
        assert!(router.resolve(RouteMethod::Get, "/internal/shutdown").is_some());
    }

    #[test]
    fn test_exact_beats_pattern() {
        let router = Router::builder()
            .get_pattern(r"^/users/(\w+)$", named("pattern"))
            .unwrap()
            .get("/users/me", named("exact"))
            .build();

        let exact = router.resolve(RouteMethod::Get, "/users/me").unwrap();
        assert_eq!(exact.label, "[GET] /users/me");
        assert!(exact.captures.is_empty());

        let pattern = router.resolve(RouteMethod::Get, "/users/bob").unwrap();
        assert_eq!(pattern.label, r"[GET] ^/users/(\w+)$");
        assert_eq!(pattern.captures, vec!["bob".to_string()]);
    }

    #[test]
    fn test_patterns_first_match_wins() {
        let router = Router::builder()
            .post_pattern(r"^/items/(\d+)$", named("digits"))
            .unwrap()
            .post_pattern(r"^/items/(.+)$", named("any"))
            .unwrap()
            .build();

        let hit = router.resolve(RouteMethod::Post, "/items/12").unwrap();
        assert_eq!(hit.label, r"[POST] ^/items/(\d+)$");

        let hit = router.resolve(RouteMethod::Post, "/items/x").unwrap();
        assert_eq!(hit.label, "[POST] ^/items/(.+)$");
        assert_eq!(hit.captures, vec!["x".to_string()]);
    }

    #[test]
    fn test_pattern_without_groups_matches() {
        let router = Router::builder()
            .get_pattern(r"^/health/deep$", named("deep"))
            .unwrap()
            .build();
        let hit = router.resolve(RouteMethod::Get, "/health/deep").unwrap();
        assert!(hit.captures.is_empty());
        assert!(router.resolve(RouteMethod::Get, "/health/deeper").is_none());
    }

    #[test]
    fn test_bad_pattern_fails_registration() {
        let result = Router::builder().get_pattern("(unclosed", named("x"));
        assert!(result.is_err());
    }

    #[test]
    fn test_last_registration_wins() {
        let router = Router::builder()
            .get("/dup", named("first"))
            .get("/dup", named("second"))
            .build();
        // one stats record per label, shared by both registrations
        assert!(router.stats().get("[GET] /dup").is_some());
        let resolved = router.resolve(RouteMethod::Get, "/dup").unwrap();
        assert!(Arc::ptr_eq(
            resolved.record,
            router.stats().get("[GET] /dup").unwrap()
        ));
    }

    #[test]
    fn test_stats_labels_created_at_registration() {
        let router = Router::builder()
            .post("/orders", named("o"))
            .get_pattern(r"^/o/(\d+)$", named("p"))
            .unwrap()
            .build();
        let rendered = router.stats().render();
        assert!(rendered.contains("[POST] /orders: insufficient data"));
        assert!(rendered.contains(r"[GET] ^/o/(\d+)$: insufficient data"));
        assert!(rendered.contains("[GET] /ping: insufficient data"));
    }
}
