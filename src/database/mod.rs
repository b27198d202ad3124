pub mod manager;
pub mod models;
pub mod pg_store;
pub mod query_builder;
pub mod store;

pub use manager::{DatabaseError, DatabaseManager};
pub use pg_store::PgStore;
pub use query_builder::BookmarkQuery;
pub use store::{BookmarkWrite, Store};
