//! Reserved routes registered before any user route.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::error::{AuthError, TransportError};
use crate::http::context::{RequestContext, TEXT_PLAIN_UTF8};

pub const PING_PATH: &str = "/ping";
pub const STATS_PATH: &str = "/internal/stats";
pub const SHUTDOWN_PATH: &str = "/internal/shutdown";

/// Header carrying the control token on the shutdown route.
pub const CONTROL_TOKEN_HEADER: &str = "x-control-token";

/// Liveness probe.
pub async fn ping(_ctx: RequestContext) -> Response {
    ([(header::CONTENT_TYPE, TEXT_PLAIN_UTF8)], "OK").into_response()
}

/// Latency records, one per line.
pub async fn stats(ctx: RequestContext) -> Response {
    (
        [(header::CONTENT_TYPE, TEXT_PLAIN_UTF8)],
        ctx.stats().render(),
    )
        .into_response()
}

/// Exit the process. Requires the control token in the `token` query
/// parameter or the `x-control-token` header.
pub async fn shutdown(ctx: RequestContext) -> Response {
    let supplied = ctx
        .query_param("token")
        .or_else(|| ctx.header(CONTROL_TOKEN_HEADER).map(str::to_string))
        .unwrap_or_default();

    if !ctx.auth().verify_token(&supplied) {
        tracing::warn!(request_id = %ctx.request_id, "Rejected unauthenticated shutdown request");
        return TransportError::Auth(AuthError::TokenMismatch).into_response();
    }

    tracing::warn!(request_id = %ctx.request_id, "Shutdown requested, exiting");
    ctx.exit();
    (StatusCode::OK, "OK").into_response()
}
