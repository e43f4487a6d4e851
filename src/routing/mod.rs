//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route registration (at startup):
//!     RouterBuilder::new()      (built-in /ping, /internal/stats)
//!     → .get / .post            (exact table, last write wins)
//!     → .get_pattern / ...      (compiled regex, ordered)
//!     → .build()                (immutable Router)
//!
//! Incoming request (method, path):
//!     → router.rs  exact table lookup
//!     → matcher.rs pattern scan in registration order
//!     → Resolution { handler, latency record, captures } or None
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Exact match always beats a pattern match
//! - Deterministic: first matching pattern wins

pub mod handler;
pub mod matcher;
pub mod router;

pub use handler::{BoxHandler, Handler};
pub use matcher::{PatternRoute, RouteMethod};
pub use router::{Resolution, Router, RouterBuilder};
