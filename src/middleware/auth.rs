use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::services::ServiceError;
use crate::state::AppState;

/// Header carrying the session token. `HeaderMap` lookups ignore case.
pub const TOKEN_HEADER: &str = "x-token";

/// Routes reachable without a token. Matched against the exact request path.
pub const PUBLIC_PATHS: [&str; 3] = ["/auth/register", "/auth/login", "/ping"];

pub fn is_public_path(path: &str) -> bool {
    PUBLIC_PATHS.contains(&path)
}

/// Token authentication middleware that resolves `x-token` to a user and
/// injects the identity into the request extensions
pub async fn token_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if is_public_path(request.uri().path()) {
        return Ok(next.run(request).await);
    }

    let token = extract_token_from_headers(request.headers())
        .map(str::to_owned)
        .ok_or_else(unauthorized)?;

    let user = match state.credentials.resolve_token(&token).await {
        Ok(user) => user,
        Err(ServiceError::Unauthorized) => {
            tracing::debug!(path = %request.uri().path(), "rejected unknown token");
            return Err(unauthorized());
        }
        Err(e) => return Err(e.into()),
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

fn extract_token_from_headers(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|token| !token.is_empty())
}

fn unauthorized() -> ApiError {
    ApiError::unauthorized("Unauthorized")
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<AuthUser>().cloned().ok_or_else(unauthorized)
    }
}
