//! Runs the services and the router over `PgStore`. Every test returns early
//! when `DATABASE_URL` is not configured.

mod common;

use std::sync::Arc;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

use bookmarker_api::auth::AuthUser;
use bookmarker_api::config::AppConfig;
use bookmarker_api::database::models::{Bookmark, BookmarkDraft, BookmarkPatch};
use bookmarker_api::database::{DatabaseError, DatabaseManager, PgStore, Store};
use bookmarker_api::services::{BookmarkService, CredentialService, ServiceError, TagService};

use common::{postgres, unique_email, TestServer, PASSWORD};

struct Services {
    store: Arc<PgStore>,
    credentials: CredentialService,
    bookmarks: BookmarkService,
    tags: TagService,
}

impl Services {
    fn new(manager: &DatabaseManager) -> Self {
        let store = Arc::new(PgStore::new(manager));
        let mut security = AppConfig::development().security;
        security.password_hash_cost = 4;
        Self {
            credentials: CredentialService::new(store.clone(), &security),
            bookmarks: BookmarkService::new(store.clone()),
            tags: TagService::new(store.clone()),
            store,
        }
    }

    async fn user(&self, prefix: &str) -> Result<AuthUser> {
        let token = self.credentials.register(&unique_email(prefix), PASSWORD).await?;
        Ok(self.credentials.resolve_token(&token).await?)
    }

    async fn tag(&self, user: &AuthUser, name: &str) -> Result<i64> {
        Ok(self.tags.create(user, name).await?.id)
    }

    async fn bookmark(&self, user: &AuthUser, name: &str, tag_ids: &[i64]) -> Result<Bookmark> {
        let draft = BookmarkDraft {
            name: Some(name.to_string()),
            tag_ids: tag_ids.to_vec(),
            ..Default::default()
        };
        Ok(self.bookmarks.create(user, draft).await?)
    }

    async fn names(&self, user: &AuthUser, tag_ids: &[i64]) -> Result<Vec<String>> {
        let listed = self.bookmarks.list(user, tag_ids).await?;
        Ok(listed.into_iter().map(|b| b.name.unwrap_or_default()).collect())
    }
}

#[tokio::test]
async fn migrate_is_idempotent() -> Result<()> {
    let Some(manager) = postgres().await? else { return Ok(()) };

    manager.migrate().await?;
    manager.migrate().await?;
    manager.health_check().await?;
    Ok(())
}

#[tokio::test]
async fn unique_constraints_are_classified() -> Result<()> {
    let Some(manager) = postgres().await? else { return Ok(()) };
    let s = Services::new(&manager);
    let email = unique_email("constraint");

    s.store.insert_user(&email, "hash", &uuid::Uuid::new_v4().to_string()).await?;
    let err = s
        .store
        .insert_user(&email, "hash", &uuid::Uuid::new_v4().to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, DatabaseError::UniqueViolation(ref c) if c == "users_email_key"), "{:?}", err);

    let user = s.user("tag-constraint").await?;
    s.store.insert_tag(user.id, "once").await?;
    let err = s.store.insert_tag(user.id, "once").await.unwrap_err();
    assert!(matches!(err, DatabaseError::UniqueViolation(ref c) if c == "uidx_name_user_id"), "{:?}", err);
    Ok(())
}

#[tokio::test]
async fn register_conflict_and_login_rotation() -> Result<()> {
    let Some(manager) = postgres().await? else { return Ok(()) };
    let s = Services::new(&manager);
    let email = unique_email("rotate");

    let first = s.credentials.register(&email, PASSWORD).await?;
    assert!(matches!(s.credentials.register(&email, PASSWORD).await, Err(ServiceError::Conflict(_))));

    let second = s.credentials.login(&email, PASSWORD).await?;
    assert_ne!(first, second);
    assert!(matches!(s.credentials.resolve_token(&first).await, Err(ServiceError::Unauthorized)));
    assert_eq!(s.credentials.resolve_token(&second).await?.email, email);

    assert!(matches!(
        s.credentials.login(&email, "not the password").await,
        Err(ServiceError::InvalidCredentials)
    ));
    assert!(matches!(
        s.credentials.login(&unique_email("ghost"), PASSWORD).await,
        Err(ServiceError::NotFound(_))
    ));
    Ok(())
}

#[tokio::test]
async fn tag_filter_is_a_union_without_duplicates() -> Result<()> {
    let Some(manager) = postgres().await? else { return Ok(()) };
    let s = Services::new(&manager);
    let alice = s.user("alice").await?;
    let bob = s.user("bob").await?;

    let t1 = s.tag(&alice, "t1").await?;
    let t2 = s.tag(&alice, "t2").await?;
    let t3 = s.tag(&alice, "t3").await?;
    s.bookmark(&alice, "A", &[t1]).await?;
    s.bookmark(&alice, "B", &[t3]).await?;
    s.bookmark(&alice, "C", &[t2]).await?;
    s.bookmark(&alice, "D", &[t1, t2]).await?;

    assert_eq!(s.names(&alice, &[t1, t2]).await?, vec!["A", "C", "D"]);
    assert_eq!(s.names(&alice, &[]).await?, vec!["A", "B", "C", "D"]);

    let bobs_tag = s.tag(&bob, "t1").await?;
    s.bookmark(&bob, "hidden", &[bobs_tag]).await?;
    assert!(s.names(&alice, &[bobs_tag]).await?.is_empty());
    assert_eq!(s.names(&bob, &[t1, bobs_tag]).await?, vec!["hidden"]);
    Ok(())
}

#[tokio::test]
async fn foreign_tags_roll_back_the_whole_write() -> Result<()> {
    let Some(manager) = postgres().await? else { return Ok(()) };
    let s = Services::new(&manager);
    let alice = s.user("alice").await?;
    let bob = s.user("bob").await?;
    let own = s.tag(&alice, "own").await?;
    let other = s.tag(&alice, "other").await?;
    let bobs_tag = s.tag(&bob, "bob").await?;

    let err = s.bookmark(&alice, "rejected", &[own, bobs_tag]).await.unwrap_err();
    assert!(matches!(err.downcast_ref::<ServiceError>(), Some(ServiceError::Validation(_))));
    assert!(s.names(&alice, &[]).await?.is_empty());

    let kept = s.bookmark(&alice, "kept", &[own]).await?;
    let patch = BookmarkPatch {
        name: Some("renamed".to_string()),
        tag_ids: Some(vec![other, bobs_tag]),
        ..Default::default()
    };
    let err = s.bookmarks.update(&alice, kept.id, patch).await.unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));

    assert_eq!(s.names(&alice, &[own]).await?, vec!["kept"]);
    assert!(s.names(&alice, &[other]).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn update_and_delete_are_owner_scoped() -> Result<()> {
    let Some(manager) = postgres().await? else { return Ok(()) };
    let s = Services::new(&manager);
    let alice = s.user("alice").await?;
    let bob = s.user("bob").await?;
    let bobs = s.bookmark(&bob, "bob's", &[]).await?;

    let patch = BookmarkPatch { name: Some("hijacked".to_string()), ..Default::default() };
    let err = s.bookmarks.update(&alice, bobs.id, patch).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));

    s.bookmarks.delete(&alice, bobs.id).await?;
    assert_eq!(s.names(&bob, &[]).await?, vec!["bob's"]);

    let bobs_tag = s.tag(&bob, "mine").await?;
    assert!(matches!(s.tags.update(&alice, bobs_tag, "stolen").await, Err(ServiceError::NotFound(_))));
    s.tags.delete(&alice, bobs_tag).await?;
    assert_eq!(s.tags.list(&bob).await?.len(), 1);

    s.bookmarks.delete(&bob, bobs.id).await?;
    assert!(s.names(&bob, &[]).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn tag_rename_conflict_and_delete_cascade() -> Result<()> {
    let Some(manager) = postgres().await? else { return Ok(()) };
    let s = Services::new(&manager);
    let alice = s.user("alice").await?;

    s.tag(&alice, "one").await?;
    let two = s.tag(&alice, "two").await?;
    assert!(matches!(s.tags.update(&alice, two, "one").await, Err(ServiceError::Conflict(_))));
    assert!(matches!(s.tags.create(&alice, "one").await, Err(ServiceError::Conflict(_))));

    s.bookmark(&alice, "tagged", &[two]).await?;
    s.tags.delete(&alice, two).await?;
    assert!(s.names(&alice, &[two]).await?.is_empty());
    assert_eq!(s.names(&alice, &[]).await?, vec!["tagged"]);
    Ok(())
}

#[tokio::test]
async fn http_contract_over_postgres() -> Result<()> {
    let Some(manager) = postgres().await? else { return Ok(()) };
    let server = TestServer::spawn_with_store(Arc::new(PgStore::new(&manager))).await?;
    let token = server.register(&unique_email("http")).await?;

    let tag = server.create_tag(&token, "web").await?;
    let res = server.post("/tag", Some(&token), json!({ "name": "web" })).await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    server.create_bookmark(&token, json!({ "name": "tagged", "tags": [tag] })).await?;
    server.create_bookmark(&token, json!({ "name": "plain" })).await?;
    assert_eq!(server.list_names(&token, &[tag]).await?, vec!["tagged"]);

    let res = server.post("/bookmark", Some(&token), json!({})).await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}
