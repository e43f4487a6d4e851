//! Per-request context handed to route handlers.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use axum::body::Bytes;
use axum::http::{header, HeaderMap, Method};
use axum::response::{IntoResponse, Response};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::auth::Authenticator;
use crate::config::TransportConfig;
use crate::error::{TransportError, TransportResult};
use crate::http::envelope::{BaseRequest, RequestPool, ResponseEnvelope, ResponsePool};
use crate::http::log_flags::LogFlag;
use crate::observability::{StatsCollector, ACCESS_TARGET};
use crate::pool::{ClientPool, Pooled};

/// Content type of envelope responses.
pub const APPLICATION_JSON_UTF8: &str = "application/json; charset=utf-8";

/// Content type of plain-text responses.
pub const TEXT_PLAIN_UTF8: &str = "text/plain; charset=utf-8";

/// Called by the shutdown route.
pub type ExitHook = Arc<dyn Fn() + Send + Sync>;

/// Process-wide resources shared by every request.
pub struct Services {
    pub responses: ResponsePool,
    pub requests: RequestPool,
    pub clients: ClientPool,
    pub auth: Arc<Authenticator>,
    exit: ExitHook,
}

impl Services {
    pub fn new(config: &TransportConfig) -> Self {
        Self {
            responses: ResponsePool::default(),
            requests: RequestPool::default(),
            clients: ClientPool::new(config.client.clone()),
            auth: Arc::new(Authenticator::new(&config.auth)),
            exit: Arc::new(|| std::process::exit(0)),
        }
    }

    /// Replace what the shutdown route does. Tests swap in a flag.
    pub fn with_exit_hook(mut self, exit: ExitHook) -> Self {
        self.exit = exit;
        self
    }
}

impl Default for Services {
    fn default() -> Self {
        Self::new(&TransportConfig::default())
    }
}

impl fmt::Debug for Services {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Services")
            .field("responses", &self.responses)
            .field("requests", &self.requests)
            .field("clients", &self.clients)
            .finish_non_exhaustive()
    }
}

/// Everything a handler knows about the request it is serving.
#[derive(Debug)]
pub struct RequestContext {
    pub request_id: Uuid,
    pub method: Method,
    pub path: String,
    /// Raw query string, without the leading `?`.
    pub query: Option<String>,
    pub headers: HeaderMap,
    /// Request body; empty for GET.
    pub body: Bytes,
    /// When the dispatcher started processing the request.
    pub started: Instant,
    /// Capture groups of the matching pattern route, left to right.
    pub captures: Vec<String>,
    pub(crate) log_flag: LogFlag,
    pub(crate) truncate_limit: usize,
    pub(crate) services: Arc<Services>,
    pub(crate) stats: Arc<StatsCollector>,
}

impl RequestContext {
    pub fn captures(&self) -> &[String] {
        &self.captures
    }

    pub fn auth(&self) -> &Authenticator {
        &self.services.auth
    }

    pub fn stats(&self) -> &StatsCollector {
        &self.stats
    }

    pub fn clients(&self) -> &ClientPool {
        &self.services.clients
    }

    /// First value of query parameter `name`, percent-decoded.
    pub fn query_param(&self, name: &str) -> Option<String> {
        let query = self.query.as_deref()?;
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }

    /// Header value as text, if present and valid.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Decode the JSON body.
    pub fn decode<T: DeserializeOwned>(&self) -> TransportResult<T> {
        serde_json::from_slice(&self.body).map_err(|e| {
            tracing::warn!(request_id = %self.request_id, path = %self.path, error = %e, "Decode error");
            TransportError::Decode(e)
        })
    }

    /// A zeroed response envelope from the shared pool.
    pub fn response(&self) -> Pooled<ResponseEnvelope> {
        self.services.responses.acquire()
    }

    /// A zeroed base request envelope from the shared pool.
    pub fn request_envelope(&self) -> Pooled<BaseRequest> {
        self.services.requests.acquire()
    }

    /// Serialize `envelope`, return it to the pool, and build the HTTP
    /// response. Logs the body when the path's log flag asks for it.
    pub fn send(&self, envelope: Pooled<ResponseEnvelope>) -> Response {
        let status = envelope.http_status();
        let serialized = serde_json::to_vec(&*envelope);
        envelope.release();

        let body = match serialized {
            Ok(body) => body,
            Err(e) => {
                tracing::error!(request_id = %self.request_id, path = %self.path, error = %e, "Response serialization failed");
                return TransportError::Serialization(e).into_response();
            }
        };

        if self.log_flag.enabled() {
            tracing::info!(
                target: ACCESS_TARGET,
                request_id = %self.request_id,
                method = %self.method,
                path = %self.path,
                elapsed = ?self.started.elapsed(),
                body = %self.log_flag.clip(&body, self.truncate_limit),
                "Response"
            );
        }

        (
            status,
            [(header::CONTENT_TYPE, APPLICATION_JSON_UTF8)],
            body,
        )
            .into_response()
    }

    /// Run the shutdown hook.
    pub(crate) fn exit(&self) {
        (self.services.exit)();
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// A context for `path` with the given body, outside any dispatcher.
    pub fn context(method: Method, path: &str, body: &str, services: Arc<Services>) -> RequestContext {
        let (path, query) = match path.split_once('?') {
            Some((p, q)) => (p.to_string(), Some(q.to_string())),
            None => (path.to_string(), None),
        };
        RequestContext {
            request_id: Uuid::new_v4(),
            method,
            path,
            query,
            headers: HeaderMap::new(),
            body: Bytes::from(body.to_string()),
            started: Instant::now(),
            captures: Vec::new(),
            log_flag: LogFlag::ALL,
            truncate_limit: 255,
            services,
            stats: Arc::new(StatsCollector::new()),
        }
    }
}
