#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::{Client, Response, StatusCode};
use serde_json::{json, Value};

use bookmarker_api::config::{AppConfig, DatabaseConfig};
use bookmarker_api::database::{DatabaseManager, Store};
use bookmarker_api::testing::MemoryStore;
use bookmarker_api::{app, AppState};

pub const PASSWORD: &str = "correct horse battery staple";

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub client: Client,
}

impl TestServer {
    /// Serve the full router on a free port, backed by an in-memory store.
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with_store(Arc::new(MemoryStore::new())).await
    }

    pub async fn spawn_with_store(store: Arc<dyn Store>) -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut config = AppConfig::development();
        config.server.host = "127.0.0.1".to_string();
        config.server.port = port;
        config.security.password_hash_cost = 4;
        config.api.enable_request_logging = false;

        let router = app(AppState::new(store, config));
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test listener")?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        let server = Self { port, base_url, client: Client::new() };
        server.wait_ready(Duration::from_secs(5)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = self.client.get(self.url("/ping")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(25)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn post(&self, path: &str, token: Option<&str>, body: Value) -> Result<Response> {
        let mut request = self.client.post(self.url(path)).json(&body);
        if let Some(token) = token {
            request = request.header("x-token", token);
        }
        Ok(request.send().await?)
    }

    pub async fn patch(&self, path: &str, token: &str, body: Value) -> Result<Response> {
        Ok(self
            .client
            .patch(self.url(path))
            .header("x-token", token)
            .json(&body)
            .send()
            .await?)
    }

    pub async fn get(&self, path: &str, token: &str) -> Result<Response> {
        Ok(self.client.get(self.url(path)).header("x-token", token).send().await?)
    }

    pub async fn delete(&self, path: &str, token: &str) -> Result<Response> {
        Ok(self.client.delete(self.url(path)).header("x-token", token).send().await?)
    }

    /// Register `email` and return the issued token.
    pub async fn register(&self, email: &str) -> Result<String> {
        let resp = self
            .post("/auth/register", None, json!({ "email": email, "password": PASSWORD }))
            .await?;
        anyhow::ensure!(resp.status() == StatusCode::OK, "register returned {}", resp.status());
        token_from(resp).await
    }

    pub async fn create_tag(&self, token: &str, name: &str) -> Result<i64> {
        let resp = self.post("/tag", Some(token), json!({ "name": name })).await?;
        anyhow::ensure!(resp.status() == StatusCode::OK, "create tag returned {}", resp.status());
        id_from(resp).await
    }

    pub async fn create_bookmark(&self, token: &str, body: Value) -> Result<i64> {
        let resp = self.post("/bookmark", Some(token), body).await?;
        anyhow::ensure!(resp.status() == StatusCode::OK, "create bookmark returned {}", resp.status());
        id_from(resp).await
    }

    /// Names of the bookmarks listed for `tags`, in response order.
    pub async fn list_names(&self, token: &str, tags: &[i64]) -> Result<Vec<String>> {
        let resp = self.post("/bookmark/list", Some(token), json!({ "tags": tags })).await?;
        anyhow::ensure!(resp.status() == StatusCode::OK, "list returned {}", resp.status());
        let body: Value = resp.json().await?;
        Ok(body
            .as_array()
            .context("list response is not an array")?
            .iter()
            .map(|b| b["name"].as_str().unwrap_or_default().to_string())
            .collect())
    }
}

pub async fn token_from(resp: Response) -> Result<String> {
    let body: Value = resp.json().await?;
    body["token"]
        .as_str()
        .map(str::to_string)
        .context("response carries no token")
}

pub async fn id_from(resp: Response) -> Result<i64> {
    let body: Value = resp.json().await?;
    body["id"].as_i64().context("response carries no id")
}

/// Connect to `DATABASE_URL` (loaded from `.env` when present) and apply the
/// schema. `None` when no database is configured, so callers can skip.
pub async fn postgres() -> Result<Option<DatabaseManager>> {
    let _ = dotenvy::dotenv();
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set; skipping Postgres-backed test");
        return Ok(None);
    };

    let config = DatabaseConfig {
        url: Some(url),
        max_connections: 4,
        ..DatabaseConfig::default()
    };
    let manager = DatabaseManager::connect(&config).await?;
    manager.migrate().await?;
    Ok(Some(manager))
}

/// An email no other test run has used, for suites sharing one database.
pub fn unique_email(prefix: &str) -> String {
    format!("{}-{}@example.com", prefix, uuid::Uuid::new_v4().simple())
}
