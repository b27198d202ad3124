use sqlx::{self, postgres::PgArguments, FromRow, PgPool};

use crate::database::manager::DatabaseError;
use crate::database::models::Bookmark;

/// Column list shared by every statement that returns whole bookmark rows.
pub const BOOKMARK_COLUMNS: &str =
    "b.id, b.name, b.link, b.description, b.user_id, b.created_at, b.updated_at";

/// A value bound to a `$n` placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Int(i64),
    IntArray(Vec<i64>),
}

/// Rendered statement plus its parameters, in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<SqlParam>,
}

#[derive(Debug, Clone, PartialEq)]
enum Predicate {
    Eq { column: &'static str, value: i64 },
    AnyOf { column: &'static str, values: Vec<i64> },
}

impl Predicate {
    fn render(&self, index: usize) -> (String, SqlParam) {
        match self {
            Predicate::Eq { column, value } => (format!("{} = ${}", column, index), SqlParam::Int(*value)),
            Predicate::AnyOf { column, values } => {
                (format!("{} = ANY(${})", column, index), SqlParam::IntArray(values.clone()))
            }
        }
    }
}

/// Tag-filtered bookmark listing for one owner.
///
/// The owner predicate is always present. Adding tag ids joins `bookmark_tags`
/// and keeps bookmarks attached to at least one of them; rows are de-duplicated
/// so a bookmark carrying several requested tags is returned once. Results are
/// ordered by bookmark id.
#[derive(Debug, Clone, PartialEq)]
pub struct BookmarkQuery {
    owner_id: i64,
    tag_ids: Vec<i64>,
}

impl BookmarkQuery {
    pub fn owned_by(owner_id: i64) -> Self {
        Self { owner_id, tag_ids: vec![] }
    }

    pub fn with_any_tag(mut self, tag_ids: impl IntoIterator<Item = i64>) -> Self {
        for id in tag_ids {
            if !self.tag_ids.contains(&id) {
                self.tag_ids.push(id);
            }
        }
        self
    }

    pub fn owner_id(&self) -> i64 {
        self.owner_id
    }

    pub fn tag_ids(&self) -> &[i64] {
        &self.tag_ids
    }

    fn predicates(&self) -> Vec<Predicate> {
        let mut predicates = vec![Predicate::Eq { column: "b.user_id", value: self.owner_id }];
        if !self.tag_ids.is_empty() {
            predicates.push(Predicate::AnyOf { column: "bt.tag_id", values: self.tag_ids.clone() });
        }
        predicates
    }

    pub fn to_sql(&self) -> SqlResult {
        let mut conditions = Vec::new();
        let mut params = Vec::new();
        for (i, predicate) in self.predicates().iter().enumerate() {
            let (condition, param) = predicate.render(i + 1);
            conditions.push(condition);
            params.push(param);
        }

        let (select, join) = if self.tag_ids.is_empty() {
            ("SELECT", String::new())
        } else {
            ("SELECT DISTINCT", "INNER JOIN bookmark_tags bt ON bt.bookmark_id = b.id".to_string())
        };

        let query = [
            format!("{} {}", select, BOOKMARK_COLUMNS),
            "FROM bookmarks b".to_string(),
            join,
            format!("WHERE {}", conditions.join(" AND ")),
            "ORDER BY b.id".to_string(),
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

        SqlResult { query, params }
    }

    pub async fn fetch_all(&self, pool: &PgPool) -> Result<Vec<Bookmark>, DatabaseError> {
        let sql_result = self.to_sql();
        let mut q = sqlx::query_as::<_, Bookmark>(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param_query_as(q, p);
        }
        let rows = q.fetch_all(pool).await?;
        Ok(rows)
    }
}

fn bind_param_query_as<'q, O>(
    q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>,
    v: &SqlParam,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, sqlx::postgres::PgRow>,
{
    match v {
        SqlParam::Int(i) => q.bind(*i),
        SqlParam::IntArray(values) => q.bind(values.clone()),
    }
}
