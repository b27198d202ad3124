use std::sync::Arc;

use crate::config::AppConfig;
use crate::database::Store;
use crate::services::{BookmarkService, CredentialService, TagService};

/// Shared handler state. Cloned per request; every field is a cheap handle.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub credentials: CredentialService,
    pub bookmarks: BookmarkService,
    pub tags: TagService,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: AppConfig) -> Self {
        Self {
            credentials: CredentialService::new(store.clone(), &config.security),
            bookmarks: BookmarkService::new(store.clone()),
            tags: TagService::new(store),
            config: Arc::new(config),
        }
    }
}
