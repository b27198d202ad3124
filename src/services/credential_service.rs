use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::auth::{generate_token, hash_password, verify_password, AuthUser};
use crate::config::SecurityConfig;
use crate::database::{DatabaseError, Store};

use super::{ServiceError, ServiceResult};

/// Registration, login and token resolution over the `users` relation.
#[derive(Clone)]
pub struct CredentialService {
    store: Arc<dyn Store>,
    hash_cost: u32,
    min_password_length: usize,
    /// Hash verified against when the email is unknown, so both login
    /// failures spend the same bcrypt work.
    decoy_hash: Arc<OnceCell<String>>,
}

impl CredentialService {
    pub fn new(store: Arc<dyn Store>, security: &SecurityConfig) -> Self {
        Self {
            store,
            hash_cost: security.password_hash_cost,
            min_password_length: security.min_password_length,
            decoy_hash: Arc::new(OnceCell::new()),
        }
    }

    /// Create an account and return its first token.
    pub async fn register(&self, email: &str, password: &str) -> ServiceResult<String> {
        validate_email(email)?;
        if password.is_empty() {
            return Err(ServiceError::validation("password is required"));
        }
        if password.chars().count() < self.min_password_length {
            return Err(ServiceError::validation(format!(
                "password must be at least {} characters",
                self.min_password_length
            )));
        }

        if self.store.find_user_by_email(email).await?.is_some() {
            return Err(ServiceError::conflict("email is already registered"));
        }

        let hash = hash_password(password, self.hash_cost).await?;
        let token = generate_token();

        match self.store.insert_user(email, &hash, &token).await {
            Ok(user) => {
                tracing::info!(user_id = user.id, "registered new user");
                Ok(token)
            }
            // Lost a race with a concurrent registration for the same email
            Err(DatabaseError::UniqueViolation(_)) => Err(ServiceError::conflict("email is already registered")),
            Err(e) => Err(e.into()),
        }
    }

    /// Check credentials and rotate the user's token. The previous token stops
    /// resolving as soon as this returns.
    pub async fn login(&self, email: &str, password: &str) -> ServiceResult<String> {
        validate_email(email)?;
        if password.is_empty() {
            return Err(ServiceError::validation("password is required"));
        }

        let Some(user) = self.store.find_user_by_email(email).await? else {
            let decoy = self
                .decoy_hash
                .get_or_try_init(|| hash_password("decoy password", self.hash_cost))
                .await?;
            verify_password(password, decoy).await?;
            return Err(ServiceError::not_found("user not found"));
        };

        if !verify_password(password, &user.password).await? {
            tracing::debug!(user_id = user.id, "login rejected: password mismatch");
            return Err(ServiceError::InvalidCredentials);
        }

        let token = generate_token();
        self.store.update_user_token(user.id, &token).await?;
        tracing::debug!(user_id = user.id, "issued new token");
        Ok(token)
    }

    /// Map a bearer token to its owner.
    pub async fn resolve_token(&self, token: &str) -> ServiceResult<AuthUser> {
        if token.is_empty() {
            return Err(ServiceError::Unauthorized);
        }
        let user = self
            .store
            .find_user_by_token(token)
            .await?
            .ok_or(ServiceError::Unauthorized)?;
        Ok(AuthUser::from(&user))
    }
}

fn validate_email(email: &str) -> ServiceResult<()> {
    if email.is_empty() {
        return Err(ServiceError::validation("email is required"));
    }
    if !is_valid_email(email) {
        return Err(ServiceError::validation("email is not a valid address"));
    }
    Ok(())
}

fn is_valid_email(email: &str) -> bool {
    if email.len() > 254 || email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|label| !label.is_empty())
}
