// handlers/public/auth/mod.rs - Token acquisition endpoints
use serde::Deserialize;

pub mod login;
pub mod register;

pub use login::login_post;
pub use register::register_post;

/// Body shared by register and login. Missing fields decode as empty strings
/// and are rejected by the credential service.
#[derive(Default, Deserialize)]
#[serde(default)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}
