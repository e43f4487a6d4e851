//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Dispatcher:
//!     → logging.rs (structured events, body logs on the access target)
//!     → stats.rs (per-route latency records)
//!
//! Consumers:
//!     → stdout / stderr sink
//!     → GET /internal/stats
//! ```

pub mod logging;
pub mod stats;

pub use logging::{init_logging, ACCESS_TARGET};
pub use stats::{Elapsed, LatencyRecord, LatencySnapshot, StatsCollector};
