// handlers/protected/mod.rs - Handlers behind the token middleware
//
// Each handler takes the resolved `AuthUser` as an extractor and passes it to
// the owning service; no handler queries across owners.
pub mod bookmark;
pub mod tag;
pub mod utils;
