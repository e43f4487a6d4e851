//! Standard request pre-check.
//!
//! Most RPC handlers start the same way: the body must be a JSON object, it must
//! decode as a [`BaseRequest`], and its token must match the control token.
//! On failure the returned envelope already carries the code, the message,
//! and the offending body.

use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::http::{BaseRequest, RequestContext, ResponseEnvelope};
use crate::pool::Pooled;

fn reject(
    ctx: &RequestContext,
    status: StatusCode,
    message: &str,
    payload: Value,
) -> Pooled<ResponseEnvelope> {
    tracing::warn!(request_id = %ctx.request_id, path = %ctx.path, reason = message, "Pre-check failed");
    let mut response = ctx.response();
    response.set_error(i32::from(status.as_u16()), message);
    response.payload = Some(payload);
    response
}

/// Decode and authenticate the base request envelope.
pub fn precheck(
    ctx: &RequestContext,
) -> Result<Pooled<BaseRequest>, Pooled<ResponseEnvelope>> {
    let raw: Value = match serde_json::from_slice::<Map<String, Value>>(&ctx.body) {
        Ok(fields) => Value::Object(fields),
        Err(e) => {
            return Err(reject(
                ctx,
                StatusCode::BAD_REQUEST,
                "body not json",
                json!({"error": e.to_string(), "body": String::from_utf8_lossy(&ctx.body)}),
            ));
        }
    };

    let mut request = ctx.request_envelope();
    match BaseRequest::deserialize(&raw) {
        Ok(decoded) => *request = decoded,
        Err(e) => {
            return Err(reject(
                ctx,
                StatusCode::BAD_REQUEST,
                "request decode error",
                json!({"error": e.to_string(), "body": raw}),
            ));
        }
    }

    if !ctx.auth().verify_token(&request.token) {
        return Err(reject(
            ctx,
            StatusCode::UNAUTHORIZED,
            "unauthorized request",
            json!({"body": raw}),
        ));
    }

    Ok(request)
}
