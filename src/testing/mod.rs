//! In-memory `Store` for tests and database-less local runs.
//!
//! Mirrors the constraints the Postgres schema enforces: unique emails and
//! tokens, unique `(name, user_id)` tags, owner foreign keys, and cascading
//! removal of `bookmark_tags` rows.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::database::models::{Bookmark, BookmarkDraft, BookmarkPatch, Tag, User};
use crate::database::store::{dedup_ids, BookmarkWrite, Store};
use crate::database::{BookmarkQuery, DatabaseError};

#[derive(Default)]
struct State {
    next_user_id: i64,
    next_bookmark_id: i64,
    next_tag_id: i64,
    users: Vec<User>,
    bookmarks: Vec<Bookmark>,
    tags: Vec<Tag>,
    bookmark_tags: Vec<(i64, i64)>,
}

impl State {
    fn user_exists(&self, id: i64) -> bool {
        self.users.iter().any(|u| u.id == id)
    }

    fn foreign_tags(&self, owner_id: i64, tag_ids: &[i64]) -> Vec<i64> {
        tag_ids
            .iter()
            .copied()
            .filter(|id| !self.tags.iter().any(|t| t.id == *id && t.user_id == owner_id))
            .collect()
    }

    fn replace_tags(&mut self, bookmark_id: i64, tag_ids: &[i64]) {
        self.bookmark_tags.retain(|(b, _)| *b != bookmark_id);
        self.bookmark_tags.extend(tag_ids.iter().map(|t| (bookmark_id, *t)));
    }
}

#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_user(&self, email: &str, password_hash: &str, token: &str) -> Result<User, DatabaseError> {
        let mut state = self.state.write().await;
        if state.users.iter().any(|u| u.email == email) {
            return Err(DatabaseError::UniqueViolation("users_email_key".to_string()));
        }
        if state.users.iter().any(|u| u.token.as_deref() == Some(token)) {
            return Err(DatabaseError::UniqueViolation("users_token_key".to_string()));
        }

        state.next_user_id += 1;
        let now = Utc::now();
        let user = User {
            id: state.next_user_id,
            email: email.to_string(),
            password: password_hash.to_string(),
            token: Some(token.to_string()),
            created_at: now,
            updated_at: now,
        };
        state.users.push(user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_token(&self, token: &str) -> Result<Option<User>, DatabaseError> {
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.token.as_deref() == Some(token)).cloned())
    }

    async fn update_user_token(&self, user_id: i64, token: &str) -> Result<(), DatabaseError> {
        let mut state = self.state.write().await;
        if state.users.iter().any(|u| u.id != user_id && u.token.as_deref() == Some(token)) {
            return Err(DatabaseError::UniqueViolation("users_token_key".to_string()));
        }
        let user = state
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or_else(|| DatabaseError::QueryError(format!("user {} vanished during token update", user_id)))?;
        user.token = Some(token.to_string());
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn list_bookmarks(&self, query: &BookmarkQuery) -> Result<Vec<Bookmark>, DatabaseError> {
        let state = self.state.read().await;
        let tag_ids = query.tag_ids();
        let mut rows: Vec<Bookmark> = state
            .bookmarks
            .iter()
            .filter(|b| b.user_id == query.owner_id())
            .filter(|b| {
                tag_ids.is_empty()
                    || state
                        .bookmark_tags
                        .iter()
                        .any(|(bookmark_id, tag_id)| *bookmark_id == b.id && tag_ids.contains(tag_id))
            })
            .cloned()
            .collect();
        rows.sort_by_key(|b| b.id);
        Ok(rows)
    }

    async fn insert_bookmark(&self, owner_id: i64, draft: &BookmarkDraft) -> Result<BookmarkWrite, DatabaseError> {
        let mut state = self.state.write().await;
        if !state.user_exists(owner_id) {
            return Err(DatabaseError::ForeignKeyViolation("bookmarks_user_id_fkey".to_string()));
        }

        let tag_ids = dedup_ids(&draft.tag_ids);
        let rejected = state.foreign_tags(owner_id, &tag_ids);
        if !rejected.is_empty() {
            return Ok(BookmarkWrite::TagsNotOwned(rejected));
        }

        state.next_bookmark_id += 1;
        let now = Utc::now();
        let bookmark = Bookmark {
            id: state.next_bookmark_id,
            name: draft.name.clone(),
            link: draft.link.clone(),
            description: draft.description.clone(),
            user_id: owner_id,
            created_at: now,
            updated_at: now,
        };
        state.bookmarks.push(bookmark.clone());
        state.replace_tags(bookmark.id, &tag_ids);
        Ok(BookmarkWrite::Written(bookmark))
    }

    async fn update_bookmark(
        &self,
        owner_id: i64,
        id: i64,
        patch: &BookmarkPatch,
    ) -> Result<BookmarkWrite, DatabaseError> {
        let mut state = self.state.write().await;
        if !state.bookmarks.iter().any(|b| b.id == id && b.user_id == owner_id) {
            return Ok(BookmarkWrite::NotFound);
        }

        let tag_ids = patch.tag_ids.as_deref().map(dedup_ids);
        if let Some(tag_ids) = &tag_ids {
            let rejected = state.foreign_tags(owner_id, tag_ids);
            if !rejected.is_empty() {
                return Ok(BookmarkWrite::TagsNotOwned(rejected));
            }
        }

        let Some(bookmark) = state.bookmarks.iter_mut().find(|b| b.id == id && b.user_id == owner_id) else {
            return Ok(BookmarkWrite::NotFound);
        };
        if let Some(name) = &patch.name {
            bookmark.name = Some(name.clone());
        }
        if let Some(link) = &patch.link {
            bookmark.link = Some(link.clone());
        }
        if let Some(description) = &patch.description {
            bookmark.description = Some(description.clone());
        }
        bookmark.updated_at = Utc::now();
        let updated = bookmark.clone();

        if let Some(tag_ids) = &tag_ids {
            state.replace_tags(id, tag_ids);
        }
        Ok(BookmarkWrite::Written(updated))
    }

    async fn delete_bookmark(&self, owner_id: i64, id: i64) -> Result<u64, DatabaseError> {
        let mut state = self.state.write().await;
        let before = state.bookmarks.len();
        state.bookmarks.retain(|b| !(b.id == id && b.user_id == owner_id));
        let removed = (before - state.bookmarks.len()) as u64;
        if removed > 0 {
            state.bookmark_tags.retain(|(b, _)| *b != id);
        }
        Ok(removed)
    }

    async fn list_tags(&self, owner_id: i64) -> Result<Vec<Tag>, DatabaseError> {
        let state = self.state.read().await;
        let mut tags: Vec<Tag> = state.tags.iter().filter(|t| t.user_id == owner_id).cloned().collect();
        tags.sort_by_key(|t| t.id);
        Ok(tags)
    }

    async fn insert_tag(&self, owner_id: i64, name: &str) -> Result<Tag, DatabaseError> {
        let mut state = self.state.write().await;
        if !state.user_exists(owner_id) {
            return Err(DatabaseError::ForeignKeyViolation("tags_user_id_fkey".to_string()));
        }
        if state.tags.iter().any(|t| t.user_id == owner_id && t.name == name) {
            return Err(DatabaseError::UniqueViolation("uidx_name_user_id".to_string()));
        }

        state.next_tag_id += 1;
        let now = Utc::now();
        let tag = Tag {
            id: state.next_tag_id,
            name: name.to_string(),
            user_id: owner_id,
            created_at: now,
            updated_at: now,
        };
        state.tags.push(tag.clone());
        Ok(tag)
    }

    async fn update_tag(&self, owner_id: i64, id: i64, name: &str) -> Result<Option<Tag>, DatabaseError> {
        let mut state = self.state.write().await;
        if !state.tags.iter().any(|t| t.id == id && t.user_id == owner_id) {
            return Ok(None);
        }
        if state.tags.iter().any(|t| t.id != id && t.user_id == owner_id && t.name == name) {
            return Err(DatabaseError::UniqueViolation("uidx_name_user_id".to_string()));
        }

        let tag = state.tags.iter_mut().find(|t| t.id == id && t.user_id == owner_id);
        Ok(tag.map(|t| {
            t.name = name.to_string();
            t.updated_at = Utc::now();
            t.clone()
        }))
    }

    async fn delete_tag(&self, owner_id: i64, id: i64) -> Result<u64, DatabaseError> {
        let mut state = self.state.write().await;
        let before = state.tags.len();
        state.tags.retain(|t| !(t.id == id && t.user_id == owner_id));
        let removed = (before - state.tags.len()) as u64;
        if removed > 0 {
            state.bookmark_tags.retain(|(_, t)| *t != id);
        }
        Ok(removed)
    }
}
