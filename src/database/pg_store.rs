use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{Bookmark, BookmarkDraft, BookmarkPatch, Tag, User};
use crate::database::query_builder::{BookmarkQuery, BOOKMARK_COLUMNS};
use crate::database::store::{dedup_ids, BookmarkWrite, Store};

const USER_COLUMNS: &str = "id, email, password, token, created_at, updated_at";
const TAG_COLUMNS: &str = "id, name, user_id, created_at, updated_at";

/// Postgres-backed store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(manager: &DatabaseManager) -> Self {
        Self { pool: manager.pool().clone() }
    }

    /// Attach only the tags owned by `owner_id`; report requested ids that were skipped.
    async fn attach_tags(
        tx: &mut Transaction<'_, Postgres>,
        owner_id: i64,
        bookmark_id: i64,
        tag_ids: &[i64],
    ) -> Result<Vec<i64>, DatabaseError> {
        if tag_ids.is_empty() {
            return Ok(vec![]);
        }

        let attached: Vec<(i64,)> = sqlx::query_as(
            r#"
            INSERT INTO bookmark_tags (bookmark_id, tag_id)
            SELECT $1, t.id FROM tags t
            WHERE t.id = ANY($2) AND t.user_id = $3
            RETURNING tag_id
            "#,
        )
        .bind(bookmark_id)
        .bind(tag_ids.to_vec())
        .bind(owner_id)
        .fetch_all(&mut **tx)
        .await?;

        let attached: Vec<i64> = attached.into_iter().map(|(id,)| id).collect();
        Ok(tag_ids.iter().copied().filter(|id| !attached.contains(id)).collect())
    }
}

#[async_trait]
impl Store for PgStore {
    async fn insert_user(&self, email: &str, password_hash: &str, token: &str) -> Result<User, DatabaseError> {
        let sql = format!(
            "INSERT INTO users (email, password, token) VALUES ($1, $2, $3) RETURNING {}",
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .bind(password_hash)
            .bind(token)
            .fetch_one(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_token(&self, token: &str) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {} FROM users WHERE token = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn update_user_token(&self, user_id: i64, token: &str) -> Result<(), DatabaseError> {
        let result = sqlx::query("UPDATE users SET token = $2, updated_at = now() WHERE id = $1")
            .bind(user_id)
            .bind(token)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::QueryError(format!("user {} vanished during token update", user_id)));
        }
        Ok(())
    }

    async fn list_bookmarks(&self, query: &BookmarkQuery) -> Result<Vec<Bookmark>, DatabaseError> {
        query.fetch_all(&self.pool).await
    }

    async fn insert_bookmark(&self, owner_id: i64, draft: &BookmarkDraft) -> Result<BookmarkWrite, DatabaseError> {
        let tag_ids = dedup_ids(&draft.tag_ids);
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "INSERT INTO bookmarks AS b (name, link, description, user_id) VALUES ($1, $2, $3, $4) RETURNING {}",
            BOOKMARK_COLUMNS
        );
        let bookmark = sqlx::query_as::<_, Bookmark>(&sql)
            .bind(&draft.name)
            .bind(&draft.link)
            .bind(&draft.description)
            .bind(owner_id)
            .fetch_one(&mut *tx)
            .await?;

        let rejected = Self::attach_tags(&mut tx, owner_id, bookmark.id, &tag_ids).await?;
        if !rejected.is_empty() {
            tx.rollback().await?;
            return Ok(BookmarkWrite::TagsNotOwned(rejected));
        }

        tx.commit().await?;
        Ok(BookmarkWrite::Written(bookmark))
    }

    async fn update_bookmark(
        &self,
        owner_id: i64,
        id: i64,
        patch: &BookmarkPatch,
    ) -> Result<BookmarkWrite, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            r#"
            UPDATE bookmarks AS b SET
                name = COALESCE($3, b.name),
                link = COALESCE($4, b.link),
                description = COALESCE($5, b.description),
                updated_at = now()
            WHERE b.id = $1 AND b.user_id = $2
            RETURNING {}
            "#,
            BOOKMARK_COLUMNS
        );
        let updated = sqlx::query_as::<_, Bookmark>(&sql)
            .bind(id)
            .bind(owner_id)
            .bind(&patch.name)
            .bind(&patch.link)
            .bind(&patch.description)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(bookmark) = updated else {
            tx.rollback().await?;
            return Ok(BookmarkWrite::NotFound);
        };

        if let Some(tag_ids) = &patch.tag_ids {
            sqlx::query("DELETE FROM bookmark_tags WHERE bookmark_id = $1")
                .bind(bookmark.id)
                .execute(&mut *tx)
                .await?;

            let rejected = Self::attach_tags(&mut tx, owner_id, bookmark.id, &dedup_ids(tag_ids)).await?;
            if !rejected.is_empty() {
                tx.rollback().await?;
                return Ok(BookmarkWrite::TagsNotOwned(rejected));
            }
        }

        tx.commit().await?;
        Ok(BookmarkWrite::Written(bookmark))
    }

    async fn delete_bookmark(&self, owner_id: i64, id: i64) -> Result<u64, DatabaseError> {
        let result = sqlx::query("DELETE FROM bookmarks WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn list_tags(&self, owner_id: i64) -> Result<Vec<Tag>, DatabaseError> {
        let sql = format!("SELECT {} FROM tags WHERE user_id = $1 ORDER BY id", TAG_COLUMNS);
        let tags = sqlx::query_as::<_, Tag>(&sql)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(tags)
    }

    async fn insert_tag(&self, owner_id: i64, name: &str) -> Result<Tag, DatabaseError> {
        let sql = format!("INSERT INTO tags (name, user_id) VALUES ($1, $2) RETURNING {}", TAG_COLUMNS);
        let tag = sqlx::query_as::<_, Tag>(&sql)
            .bind(name)
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(tag)
    }

    async fn update_tag(&self, owner_id: i64, id: i64, name: &str) -> Result<Option<Tag>, DatabaseError> {
        let sql = format!(
            "UPDATE tags SET name = $3, updated_at = now() WHERE id = $1 AND user_id = $2 RETURNING {}",
            TAG_COLUMNS
        );
        let tag = sqlx::query_as::<_, Tag>(&sql)
            .bind(id)
            .bind(owner_id)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(tag)
    }

    async fn delete_tag(&self, owner_id: i64, id: i64) -> Result<u64, DatabaseError> {
        let result = sqlx::query("DELETE FROM tags WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
