use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::post::now_millis;

/// Comment entity - never mutated once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub comment_id: Uuid,
    pub post_id: Uuid,
    #[serde(default)]
    pub username: Option<String>,
    pub text: String,
    pub time: i64,
}

impl Comment {
    pub fn new(post_id: Uuid, username: Option<String>, text: String) -> Self {
        Self {
            comment_id: Uuid::new_v4(),
            post_id,
            username,
            text,
            time: now_millis(),
        }
    }

    /// Sort oldest first, the order comments are read in.
    pub fn sort_oldest_first(comments: &mut [Comment]) {
        comments.sort_by_key(|c| c.time);
    }
}
