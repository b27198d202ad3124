use std::sync::Arc;

use crate::auth::AuthUser;
use crate::database::models::{Bookmark, BookmarkDraft, BookmarkPatch};
use crate::database::{BookmarkQuery, BookmarkWrite, Store};

use super::{ServiceError, ServiceResult};

/// Bookmark CRUD scoped to the authenticated owner.
#[derive(Clone)]
pub struct BookmarkService {
    store: Arc<dyn Store>,
}

impl BookmarkService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// All of the user's bookmarks, or only those carrying any of `tag_ids`.
    pub async fn list(&self, user: &AuthUser, tag_ids: &[i64]) -> ServiceResult<Vec<Bookmark>> {
        let query = BookmarkQuery::owned_by(user.id).with_any_tag(tag_ids.iter().copied());
        Ok(self.store.list_bookmarks(&query).await?)
    }

    pub async fn create(&self, user: &AuthUser, draft: BookmarkDraft) -> ServiceResult<Bookmark> {
        if draft.is_empty() {
            return Err(ServiceError::validation("you cannot create a completely empty bookmark"));
        }

        match self.store.insert_bookmark(user.id, &draft).await? {
            BookmarkWrite::Written(bookmark) => {
                tracing::debug!(user_id = user.id, bookmark_id = bookmark.id, "created bookmark");
                Ok(bookmark)
            }
            BookmarkWrite::TagsNotOwned(ids) => Err(unknown_tags(&ids)),
            BookmarkWrite::NotFound => Err(ServiceError::not_found("bookmark not found")),
        }
    }

    pub async fn update(&self, user: &AuthUser, id: i64, patch: BookmarkPatch) -> ServiceResult<Bookmark> {
        match self.store.update_bookmark(user.id, id, &patch).await? {
            BookmarkWrite::Written(bookmark) => Ok(bookmark),
            BookmarkWrite::NotFound => Err(ServiceError::not_found(format!("bookmark {} not found", id))),
            BookmarkWrite::TagsNotOwned(ids) => Err(unknown_tags(&ids)),
        }
    }

    /// Succeeds whether or not an owned bookmark with `id` existed.
    pub async fn delete(&self, user: &AuthUser, id: i64) -> ServiceResult<()> {
        let removed = self.store.delete_bookmark(user.id, id).await?;
        tracing::debug!(user_id = user.id, bookmark_id = id, removed, "delete bookmark");
        Ok(())
    }
}

fn unknown_tags(ids: &[i64]) -> ServiceError {
    let list = ids.iter().map(|id| id.to_string()).collect::<Vec<_>>().join(", ");
    ServiceError::validation(format!("unknown tag ids: {}", list))
}
