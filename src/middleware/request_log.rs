use std::any::Any;

use axum::{
    body::{self, Body},
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::Value;

use crate::error::ApiError;

/// Placeholder written over password fields before a body reaches the log.
pub const CENSORED: &str = "$censored";

/// Replace a top-level `password` field with [`CENSORED`]. Bodies that are
/// not a JSON object are returned unchanged.
pub fn censor_body(raw: &[u8]) -> String {
    match serde_json::from_slice::<Value>(raw) {
        Ok(Value::Object(mut map)) => {
            if let Some(password) = map.get_mut("password") {
                *password = Value::String(CENSORED.to_string());
            }
            Value::Object(map).to_string()
        }
        _ => String::from_utf8_lossy(raw).into_owned(),
    }
}

/// Log every failed request. Server errors go out at error level with a
/// censored copy of the request body; client errors at debug level.
pub async fn log_failed_requests(request: Request, next: Next) -> Result<Response, ApiError> {
    let (parts, body) = request.into_parts();
    // The size limit applied further out surfaces here as a body read error.
    let bytes = body::to_bytes(body, usize::MAX).await.map_err(|e| {
        tracing::debug!(error = %e, path = %parts.uri.path(), "failed to buffer request body");
        ApiError::PayloadTooLarge
    })?;

    let method = parts.method.clone();
    let uri = parts.uri.clone();
    let response = next.run(Request::from_parts(parts, Body::from(bytes.clone()))).await;

    let status = response.status();
    if status.is_server_error() {
        tracing::error!(
            method = %method,
            path = %uri.path(),
            query = uri.query().unwrap_or(""),
            status = status.as_u16(),
            request_body = %censor_body(&bytes),
            "request failed"
        );
    } else if status.is_client_error() {
        tracing::debug!(
            method = %method,
            path = %uri.path(),
            status = status.as_u16(),
            "request rejected"
        );
    }

    Ok(response)
}

/// Panic handler for `CatchPanicLayer::custom`.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };
    tracing::error!(panic = detail, "handler panicked");
    ApiError::internal_server_error().into_response()
}
