use axum::body::Bytes;
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// Decode a JSON request body. An empty body decodes to `T::default()` so
/// endpoints whose fields are all optional accept a bare POST.
///
/// Handlers take `Bytes` and call this instead of extracting `Json<T>`, which
/// rejects an empty body and answers malformed JSON with 422 rather than 400.
pub fn parse_json_body<T>(body: &Bytes) -> Result<T, ApiError>
where
    T: DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| ApiError::invalid_json(format!("Invalid request body: {}", e)))
}
