//! Request routing and transport layer for internal RPC services.
//!
//! Resolves method + path to a handler (exact routes, then regex routes),
//! records per-route latency, authenticates by control token or request
//! signature, and serializes pooled response envelopes.

pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod pool;
pub mod routing;

pub use auth::Authenticator;
pub use config::TransportConfig;
pub use error::{AuthError, TransportError, TransportResult};
pub use http::{HttpServer, RequestContext, ResponseEnvelope};
pub use lifecycle::Shutdown;
pub use routing::{Router, RouterBuilder};
