//! HTTP transport subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum app, trace layer)
//!     → dispatcher.rs (method filter, body read, log flags, route lookup)
//!     → handler(RequestContext)            [context.rs]
//!         → ctx.response()                 [envelope.rs, pooled]
//!         → ctx.send(envelope)             (serialize, release, log)
//!     → dispatcher records latency
//!     → Send to client
//! ```

pub mod builtin;
pub mod context;
pub mod dispatcher;
pub mod envelope;
pub mod log_flags;
pub mod server;

pub use context::{
    ExitHook, RequestContext, Services, APPLICATION_JSON_UTF8, TEXT_PLAIN_UTF8,
};
pub use dispatcher::{Dispatcher, X_REQUEST_ID};
pub use envelope::{BaseRequest, RequestPool, ResponseEnvelope, ResponsePool};
pub use log_flags::{ConfigLogFlags, LogFlag, LogFlagSource};
pub use server::HttpServer;
