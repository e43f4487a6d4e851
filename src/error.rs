//! Transport error taxonomy.
//!
//! Decode and auth failures are normally folded into a response envelope by
//! the handler. Route and serialization failures become plain-text transport
//! responses produced by the dispatcher. Pattern compile failures abort
//! startup.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Authentication failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("token mismatch")]
    TokenMismatch,

    #[error("signature mismatch")]
    SignatureMismatch,
}

/// Errors raised by the transport layer.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Request body is not valid JSON for the expected shape.
    #[error("malformed request body: {0}")]
    Decode(#[source] serde_json::Error),

    /// Request body could not be read from the connection.
    #[error("failed to read request body: {0}")]
    Body(String),

    #[error("authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("no route for {method} {path}")]
    RouteNotFound { method: String, path: String },

    /// Response envelope could not be marshalled.
    #[error("failed to serialize response: {0}")]
    Serialization(#[source] serde_json::Error),

    /// Route pattern failed to compile at registration.
    #[error("invalid route pattern `{pattern}`: {source}")]
    PatternCompile {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

impl TransportError {
    /// HTTP status used when this error reaches the wire.
    pub fn status(&self) -> StatusCode {
        match self {
            TransportError::Decode(_) | TransportError::Body(_) => StatusCode::BAD_REQUEST,
            TransportError::Auth(_) => StatusCode::UNAUTHORIZED,
            TransportError::RouteNotFound { .. } => StatusCode::NOT_FOUND,
            TransportError::Serialization(_) | TransportError::PatternCompile { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for TransportError {
    fn into_response(self) -> Response {
        let body = match &self {
            TransportError::RouteNotFound { .. } => "Not found".to_string(),
            other => other.to_string(),
        };
        (
            self.status(),
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            body,
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let not_found = TransportError::RouteNotFound {
            method: "GET".into(),
            path: "/x".into(),
        };
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);
        assert_eq!(not_found.to_string(), "no route for GET /x");

        let auth = TransportError::from(AuthError::SignatureMismatch);
        assert_eq!(auth.status(), StatusCode::UNAUTHORIZED);

        let decode = serde_json::from_str::<u32>("nope").unwrap_err();
        assert_eq!(TransportError::Decode(decode).status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_pattern_error_display() {
        let source = regex::Regex::new("(").unwrap_err();
        let err = TransportError::PatternCompile {
            pattern: "(".into(),
            source,
        };
        assert!(err.to_string().starts_with("invalid route pattern `(`"));
    }
}
