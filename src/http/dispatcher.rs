//! Request dispatch.
//!
//! # Responsibilities
//! - Accept only GET and POST; everything else is 404
//! - Log request bodies (POST) or query strings (GET) per the path's log flag
//! - Resolve the route, run the handler, record elapsed time
//!
//! # Design Decisions
//! - Handler panics are not caught here
//! - Silent mode skips the log-flag lookup entirely
//! - Elapsed time is measured from the start of dispatch, including body read

use std::sync::Arc;
use std::time::Instant;

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{HeaderValue, Request};
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use crate::config::{DispatchMode, TransportConfig};
use crate::error::TransportError;
use crate::http::context::{RequestContext, Services};
use crate::http::log_flags::{LogFlag, LogFlagSource};
use crate::observability::ACCESS_TARGET;
use crate::routing::{RouteMethod, Router};

/// Request ID header, read from the client or generated.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Resolves and runs handlers. Cheap to clone; shared as axum state.
#[derive(Clone)]
pub struct Dispatcher {
    router: Arc<Router>,
    services: Arc<Services>,
    log_flags: Arc<dyn LogFlagSource>,
    mode: DispatchMode,
    truncate_limit: usize,
    max_body_bytes: usize,
}

impl Dispatcher {
    pub fn new(
        config: &TransportConfig,
        router: Arc<Router>,
        services: Arc<Services>,
        log_flags: Arc<dyn LogFlagSource>,
    ) -> Self {
        Self {
            router,
            services,
            log_flags,
            mode: config.dispatch.mode,
            truncate_limit: config.dispatch.truncate_limit,
            max_body_bytes: config.listener.max_body_bytes,
        }
    }

    pub fn router(&self) -> &Arc<Router> {
        &self.router
    }

    pub fn services(&self) -> &Arc<Services> {
        &self.services
    }

    /// Serve one request.
    pub async fn dispatch(&self, request: Request<Body>) -> Response {
        let started = Instant::now();
        let (parts, body) = request.into_parts();

        let request_id = parts
            .headers
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| Uuid::parse_str(v).ok())
            .unwrap_or_else(Uuid::new_v4);
        let path = parts.uri.path().to_string();
        let query = parts.uri.query().map(str::to_string);

        let Some(method) = RouteMethod::from_http(&parts.method) else {
            tracing::debug!(request_id = %request_id, method = %parts.method, path = %path, "Unsupported method");
            return TransportError::RouteNotFound {
                method: parts.method.to_string(),
                path,
            }
            .into_response();
        };

        let body = match method {
            RouteMethod::Post => match axum::body::to_bytes(body, self.max_body_bytes).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::warn!(request_id = %request_id, path = %path, error = %e, "Failed to read request body");
                    return TransportError::Body(e.to_string()).into_response();
                }
            },
            RouteMethod::Get => Bytes::new(),
        };

        let log_flag = match self.mode {
            DispatchMode::Verbose => self.log_flags.log_flag(&path),
            DispatchMode::Silent => LogFlag::NONE,
        };
        if log_flag.enabled() {
            self.log_request(request_id, method, &path, query.as_deref(), &body, log_flag);
        }

        let Some(resolution) = self.router.resolve(method, &path) else {
            tracing::debug!(request_id = %request_id, method = %method, path = %path, "No route matched");
            return TransportError::RouteNotFound {
                method: method.to_string(),
                path,
            }
            .into_response();
        };

        let handler = resolution.handler.clone();
        let record = resolution.record.clone();
        let ctx = RequestContext {
            request_id,
            method: parts.method,
            path,
            query,
            headers: parts.headers,
            body,
            started,
            captures: resolution.captures,
            log_flag,
            truncate_limit: self.truncate_limit,
            services: self.services.clone(),
            stats: self.router.stats().clone(),
        };

        let mut response = handler.call(ctx).await;
        record.update(started.elapsed());

        if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
            response.headers_mut().insert(X_REQUEST_ID, value);
        }
        response
    }

    fn log_request(
        &self,
        request_id: Uuid,
        method: RouteMethod,
        path: &str,
        query: Option<&str>,
        body: &[u8],
        log_flag: LogFlag,
    ) {
        match method {
            RouteMethod::Post => tracing::info!(
                target: ACCESS_TARGET,
                request_id = %request_id,
                method = "POST",
                path = %path,
                body = %log_flag.clip(body, self.truncate_limit),
                "Request"
            ),
            RouteMethod::Get => tracing::info!(
                target: ACCESS_TARGET,
                request_id = %request_id,
                method = "GET",
                path = %path,
                query = %decode_query(query.unwrap_or_default()),
                "Request"
            ),
        }
    }
}

/// Percent-decoded query string for logging. Separators stay where they
/// were, so `a=&b=1` logs as `a=&b=1`.
fn decode_query(raw: &str) -> String {
    raw.split('&')
        .map(|pair| pair.split('=').map(unescape).collect::<Vec<_>>().join("="))
        .collect::<Vec<_>>()
        .join("&")
}

/// Decode one query component; `+` is a space.
fn unescape(component: &str) -> String {
    url::form_urlencoded::parse(component.as_bytes())
        .next()
        .map(|(key, _)| key.into_owned())
        .unwrap_or_default()
}

/// axum fallback handler wrapping [`Dispatcher::dispatch`].
pub async fn dispatch_handler(
    State(dispatcher): State<Dispatcher>,
    request: Request<Body>,
) -> Response {
    dispatcher.dispatch(request).await
}
