// handlers/protected/tag.rs - /tag routes

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;

use crate::api::{parse_json_body, TagResponse};
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

use super::utils::parse_id;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TagRequest {
    pub name: String,
}

/// GET /tag - All of the caller's tags
pub async fn list_get(State(state): State<AppState>, user: AuthUser) -> Result<Json<Vec<TagResponse>>, ApiError> {
    let tags = state.tags.list(&user).await?;
    Ok(Json(tags.into_iter().map(TagResponse::from).collect()))
}

/// POST /tag - Create a tag; 409 if the caller already has one by that name
pub async fn create_post(
    State(state): State<AppState>,
    user: AuthUser,
    body: Bytes,
) -> Result<Json<TagResponse>, ApiError> {
    let request: TagRequest = parse_json_body(&body)?;
    let tag = state.tags.create(&user, &request.name).await?;
    Ok(Json(tag.into()))
}

/// PATCH /tag/:id - Rename a tag
pub async fn update_patch(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<TagResponse>, ApiError> {
    let id = parse_id(&id)?;
    let request: TagRequest = parse_json_body(&body)?;
    let tag = state.tags.update(&user, id, &request.name).await?;
    Ok(Json(tag.into()))
}

/// DELETE /tag/:id - Remove a tag and its bookmark associations
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;
    state.tags.delete(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
