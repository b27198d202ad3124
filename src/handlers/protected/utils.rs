use crate::error::ApiError;

/// Parse a `{id}` path segment as an unsigned integer. Zero is accepted and
/// simply matches no record.
pub fn parse_id(raw: &str) -> Result<i64, ApiError> {
    match raw.parse::<i64>() {
        Ok(id) if id >= 0 => Ok(id),
        _ => Err(ApiError::bad_request(format!("invalid id '{}'", raw))),
    }
}
