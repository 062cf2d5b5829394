//! Domain entities - the core business objects.

mod comment;
mod post;
mod search;
mod user;

pub use comment::Comment;
pub use post::{Post, now_millis};
pub use search::{FillerWords, normalize_term, tokenize};
pub use user::{ProfilePatch, User, UserId};

/// Document field names shared by the engine and the store adapters.
pub mod fields {
    pub const USER_ID: &str = "user_id";
    pub const USERNAME: &str = "username";
    pub const FOLLOWING: &str = "following";
    pub const USER_IMAGE: &str = "user_image";
    pub const LIKES: &str = "likes";
    pub const SEARCH_TERMS: &str = "search_terms";
    pub const TIME: &str = "time";
    pub const POST_ID: &str = "post_id";
}
