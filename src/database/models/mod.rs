pub mod bookmark;
pub mod tag;
pub mod user;

pub use bookmark::{Bookmark, BookmarkDraft, BookmarkPatch};
pub use tag::Tag;
pub use user::User;
