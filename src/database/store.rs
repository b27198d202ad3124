use async_trait::async_trait;

use crate::database::manager::DatabaseError;
use crate::database::models::{Bookmark, BookmarkDraft, BookmarkPatch, Tag, User};
use crate::database::query_builder::BookmarkQuery;

/// Persistence boundary used by the services.
///
/// Every bookmark and tag operation takes the owner id and must apply it in the
/// same statement that locates the row, so a caller can never read or touch a
/// row it does not own. Operations that find no owned row report it through
/// `Option`/row counts, not errors.
#[async_trait]
pub trait Store: Send + Sync {
    async fn insert_user(&self, email: &str, password_hash: &str, token: &str) -> Result<User, DatabaseError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError>;

    async fn find_user_by_token(&self, token: &str) -> Result<Option<User>, DatabaseError>;

    async fn update_user_token(&self, user_id: i64, token: &str) -> Result<(), DatabaseError>;

    async fn list_bookmarks(&self, query: &BookmarkQuery) -> Result<Vec<Bookmark>, DatabaseError>;

    /// Inserts the bookmark and its tag associations atomically. Returns
    /// `TagsNotOwned` (nothing written) when a tag id is missing or owned by
    /// someone else.
    async fn insert_bookmark(&self, owner_id: i64, draft: &BookmarkDraft) -> Result<BookmarkWrite, DatabaseError>;

    async fn update_bookmark(
        &self,
        owner_id: i64,
        id: i64,
        patch: &BookmarkPatch,
    ) -> Result<BookmarkWrite, DatabaseError>;

    /// Returns the number of rows removed (0 or 1).
    async fn delete_bookmark(&self, owner_id: i64, id: i64) -> Result<u64, DatabaseError>;

    async fn list_tags(&self, owner_id: i64) -> Result<Vec<Tag>, DatabaseError>;

    async fn insert_tag(&self, owner_id: i64, name: &str) -> Result<Tag, DatabaseError>;

    async fn update_tag(&self, owner_id: i64, id: i64, name: &str) -> Result<Option<Tag>, DatabaseError>;

    async fn delete_tag(&self, owner_id: i64, id: i64) -> Result<u64, DatabaseError>;
}

/// Outcome of a bookmark insert or update.
#[derive(Debug, Clone, PartialEq)]
pub enum BookmarkWrite {
    Written(Bookmark),
    /// No bookmark with that id belongs to the owner.
    NotFound,
    /// Some requested tag ids are not tags of the owner.
    TagsNotOwned(Vec<i64>),
}

/// Distinct ids in first-seen order.
pub fn dedup_ids(ids: &[i64]) -> Vec<i64> {
    let mut unique = Vec::with_capacity(ids.len());
    for id in ids {
        if !unique.contains(id) {
            unique.push(*id);
        }
    }
    unique
}
