// handlers/protected/bookmark.rs - /bookmark routes

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;

use crate::api::{parse_json_body, BookmarkResponse};
use crate::auth::AuthUser;
use crate::database::models::{BookmarkDraft, BookmarkPatch};
use crate::error::ApiError;
use crate::state::AppState;

use super::utils::parse_id;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListRequest {
    /// Tag ids to match. Absent or empty lists every bookmark.
    pub tags: Option<Vec<i64>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BookmarkRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub link: Option<String>,
    pub tags: Option<Vec<i64>>,
}

impl From<BookmarkRequest> for BookmarkDraft {
    fn from(req: BookmarkRequest) -> Self {
        Self {
            name: req.name,
            description: req.description,
            link: req.link,
            tag_ids: req.tags.unwrap_or_default(),
        }
    }
}

impl From<BookmarkRequest> for BookmarkPatch {
    fn from(req: BookmarkRequest) -> Self {
        Self {
            name: req.name,
            description: req.description,
            link: req.link,
            tag_ids: req.tags,
        }
    }
}

/// POST /bookmark/list - Bookmarks carrying any of the requested tags
pub async fn list_post(
    State(state): State<AppState>,
    user: AuthUser,
    body: Bytes,
) -> Result<Json<Vec<BookmarkResponse>>, ApiError> {
    let request: ListRequest = parse_json_body(&body)?;
    let tag_ids = request.tags.unwrap_or_default();
    let bookmarks = state.bookmarks.list(&user, &tag_ids).await?;
    Ok(Json(bookmarks.into_iter().map(BookmarkResponse::from).collect()))
}

/// POST /bookmark - Create a bookmark, optionally tagged
pub async fn create_post(
    State(state): State<AppState>,
    user: AuthUser,
    body: Bytes,
) -> Result<Json<BookmarkResponse>, ApiError> {
    let request: BookmarkRequest = parse_json_body(&body)?;
    let bookmark = state.bookmarks.create(&user, request.into()).await?;
    Ok(Json(bookmark.into()))
}

/// PATCH /bookmark/:id - Update supplied fields; `tags` replaces the tag set
pub async fn update_patch(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<BookmarkResponse>, ApiError> {
    let id = parse_id(&id)?;
    let request: BookmarkRequest = parse_json_body(&body)?;
    let bookmark = state.bookmarks.update(&user, id, request.into()).await?;
    Ok(Json(bookmark.into()))
}

/// DELETE /bookmark/:id - 204 whether or not the caller owned it
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;
    state.bookmarks.delete(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
