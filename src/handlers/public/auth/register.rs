// handlers/public/auth/register.rs - POST /auth/register handler

use axum::{body::Bytes, extract::State, response::Json};

use crate::api::{parse_json_body, TokenResponse};
use crate::error::ApiError;
use crate::state::AppState;

use super::CredentialsRequest;

/// POST /auth/register - Create an account and return its first token
///
/// 400 on a malformed email or short password, 409 when the email is taken.
pub async fn register_post(State(state): State<AppState>, body: Bytes) -> Result<Json<TokenResponse>, ApiError> {
    let request: CredentialsRequest = parse_json_body(&body)?;
    let token = state.credentials.register(&request.email, &request.password).await?;
    Ok(Json(TokenResponse { token }))
}
