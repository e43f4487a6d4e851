//! Wire envelopes.
//!
//! Response: `{"code": 0, "message": "", "payload": ...}` with `payload`
//! omitted when absent. Base request: `{"token": "...", "payload": ...}`.
//! Both are pooled and reset to zero values when returned.

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::pool::{Pool, Reusable};

/// Pool of response envelopes.
pub type ResponsePool = Pool<ResponseEnvelope>;

/// Pool of base request envelopes.
pub type RequestPool = Pool<BaseRequest>;

/// Standard response body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub code: i32,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

impl ResponseEnvelope {
    /// Set the error code and message in one go.
    pub fn set_error(&mut self, code: i32, message: impl Into<String>) {
        self.code = code;
        self.message = message.into();
    }

    /// Attach any serializable payload.
    pub fn set_payload<T: Serialize>(&mut self, payload: &T) -> Result<(), serde_json::Error> {
        self.payload = Some(serde_json::to_value(payload)?);
        Ok(())
    }

    /// HTTP status to send this envelope with: the code itself when it is an
    /// HTTP error status, 200 otherwise.
    pub fn http_status(&self) -> StatusCode {
        u16::try_from(self.code)
            .ok()
            .filter(|code| (400..=599).contains(code))
            .and_then(|code| StatusCode::from_u16(code).ok())
            .unwrap_or(StatusCode::OK)
    }
}

impl Reusable for ResponseEnvelope {
    fn reset(&mut self) {
        self.code = 0;
        self.message.clear();
        self.payload = None;
    }
}

/// Standard request body: control token plus opaque payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BaseRequest {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub payload: Value,
}

impl Reusable for BaseRequest {
    fn reset(&mut self) {
        self.token.clear();
        self.payload = Value::Null;
    }
}
