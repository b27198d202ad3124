// handlers/public/mod.rs - Handlers reachable without a token
//
// Every path served here must also be listed in middleware::auth::PUBLIC_PATHS.
pub mod auth;
pub mod ping;

pub use ping::ping_get;
