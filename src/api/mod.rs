pub mod format;
pub mod request;

pub use format::{BookmarkResponse, TagResponse, TokenResponse};
pub use request::parse_json_body;
