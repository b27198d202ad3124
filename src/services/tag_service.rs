use std::sync::Arc;

use crate::auth::AuthUser;
use crate::database::models::Tag;
use crate::database::{DatabaseError, Store};

use super::{ServiceError, ServiceResult};

/// Tag CRUD scoped to the authenticated owner. Names are unique per owner.
#[derive(Clone)]
pub struct TagService {
    store: Arc<dyn Store>,
}

impl TagService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn list(&self, user: &AuthUser) -> ServiceResult<Vec<Tag>> {
        Ok(self.store.list_tags(user.id).await?)
    }

    pub async fn create(&self, user: &AuthUser, name: &str) -> ServiceResult<Tag> {
        let name = normalize_name(name)?;
        match self.store.insert_tag(user.id, name).await {
            Ok(tag) => Ok(tag),
            Err(DatabaseError::UniqueViolation(_)) => Err(duplicate(name)),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn update(&self, user: &AuthUser, id: i64, name: &str) -> ServiceResult<Tag> {
        let name = normalize_name(name)?;
        match self.store.update_tag(user.id, id, name).await {
            Ok(Some(tag)) => Ok(tag),
            Ok(None) => Err(ServiceError::not_found(format!("tag {} not found", id))),
            Err(DatabaseError::UniqueViolation(_)) => Err(duplicate(name)),
            Err(e) => Err(e.into()),
        }
    }

    /// Succeeds whether or not an owned tag with `id` existed.
    pub async fn delete(&self, user: &AuthUser, id: i64) -> ServiceResult<()> {
        let removed = self.store.delete_tag(user.id, id).await?;
        tracing::debug!(user_id = user.id, tag_id = id, removed, "delete tag");
        Ok(())
    }
}

fn normalize_name(name: &str) -> ServiceResult<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ServiceError::validation("tag name is required"));
    }
    Ok(name)
}

fn duplicate(name: &str) -> ServiceError {
    ServiceError::conflict(format!("tag '{}' already exists", name))
}
