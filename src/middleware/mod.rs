pub mod auth;
pub mod request_log;

pub use auth::{token_auth_middleware, PUBLIC_PATHS, TOKEN_HEADER};
pub use request_log::{censor_body, handle_panic, log_failed_requests};
