mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::TestServer;

#[tokio::test]
async fn create_and_list_tags() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.register("tags@example.com").await?;
    let id = server.create_tag(&token, "reading").await?;

    let res = server.get("/tag", &token).await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body, json!([{ "id": id, "name": "reading" }]));
    Ok(())
}

#[tokio::test]
async fn duplicate_name_conflicts_per_user_only() -> Result<()> {
    let server = TestServer::spawn().await?;
    let alice = server.register("alice@example.com").await?;
    let bob = server.register("bob@example.com").await?;

    server.create_tag(&alice, "shared").await?;
    server.create_tag(&bob, "shared").await?;

    let res = server.post("/tag", Some(&alice), json!({ "name": "shared" })).await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    Ok(())
}

#[tokio::test]
async fn blank_name_is_rejected() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.register("blank@example.com").await?;

    let res = server.post("/tag", Some(&token), json!({ "name": "  " })).await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn rename_tag() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.register("rename@example.com").await?;
    let id = server.create_tag(&token, "old").await?;

    let res = server.patch(&format!("/tag/{}", id), &token, json!({ "name": "new" })).await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body, json!({ "id": id, "name": "new" }));
    Ok(())
}

#[tokio::test]
async fn foreign_tag_is_not_found_on_update_and_untouched_on_delete() -> Result<()> {
    let server = TestServer::spawn().await?;
    let alice = server.register("alice@example.com").await?;
    let bob = server.register("bob@example.com").await?;
    let bobs = server.create_tag(&bob, "bob").await?;

    let res = server.patch(&format!("/tag/{}", bobs), &alice, json!({ "name": "stolen" })).await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = server.delete(&format!("/tag/{}", bobs), &alice).await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let body: Value = server.get("/tag", &bob).await?.json().await?;
    assert_eq!(body, json!([{ "id": bobs, "name": "bob" }]));
    Ok(())
}

#[tokio::test]
async fn deleting_tag_drops_it_from_filters() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.register("detach@example.com").await?;
    let tag = server.create_tag(&token, "temp").await?;
    server.create_bookmark(&token, json!({ "name": "tagged", "tags": [tag] })).await?;

    let res = server.delete(&format!("/tag/{}", tag), &token).await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    assert!(server.list_names(&token, &[tag]).await?.is_empty());
    assert_eq!(server.list_names(&token, &[]).await?, vec!["tagged"]);
    Ok(())
}
