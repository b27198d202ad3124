use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Bookmark {
    pub id: i64,
    pub name: Option<String>,
    pub link: Option<String>,
    pub description: Option<String>,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Content of a bookmark about to be inserted.
#[derive(Debug, Clone, Default)]
pub struct BookmarkDraft {
    pub name: Option<String>,
    pub description: Option<String>,
    pub link: Option<String>,
    pub tag_ids: Vec<i64>,
}

impl BookmarkDraft {
    /// True when no field carries content and no tag is attached.
    pub fn is_empty(&self) -> bool {
        self.tag_ids.is_empty()
            && is_blank(&self.name)
            && is_blank(&self.description)
            && is_blank(&self.link)
    }
}

/// Partial update. `None` leaves a column untouched; `tag_ids: Some(..)` replaces
/// the whole association set.
#[derive(Debug, Clone, Default)]
pub struct BookmarkPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub link: Option<String>,
    pub tag_ids: Option<Vec<i64>>,
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, str::is_empty)
}
