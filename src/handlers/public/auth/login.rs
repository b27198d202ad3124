// handlers/public/auth/login.rs - POST /auth/login handler

use axum::{body::Bytes, extract::State, response::Json};

use crate::api::{parse_json_body, TokenResponse};
use crate::error::ApiError;
use crate::services::ServiceError;
use crate::state::AppState;

use super::CredentialsRequest;

/// POST /auth/login - Verify credentials and issue a fresh token
///
/// An unknown email and a wrong password are indistinguishable to the client.
pub async fn login_post(State(state): State<AppState>, body: Bytes) -> Result<Json<TokenResponse>, ApiError> {
    let request: CredentialsRequest = parse_json_body(&body)?;
    match state.credentials.login(&request.email, &request.password).await {
        Ok(token) => Ok(Json(TokenResponse { token })),
        Err(ServiceError::NotFound(_)) | Err(ServiceError::InvalidCredentials) => {
            Err(ApiError::unauthorized("Unauthorized"))
        }
        Err(e) => Err(e.into()),
    }
}
