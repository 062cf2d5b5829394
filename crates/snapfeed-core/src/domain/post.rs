use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::{User, UserId};

/// Current wall-clock time in epoch milliseconds.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Post entity - an image with a caption, stored in the `posts` collection.
///
/// `username` and `user_image` are copies of the author's profile taken at
/// creation time; only image propagation rewrites `user_image` afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub post_id: Uuid,
    pub user_id: UserId,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub user_image: Option<String>,
    pub post_image: String,
    #[serde(default)]
    pub post_description: String,
    pub time: i64,
    #[serde(default)]
    pub likes: Vec<UserId>,
    #[serde(default)]
    pub search_terms: Vec<String>,
}

impl Post {
    /// Create a new post authored by `author` with a generated id and an empty liker set.
    pub fn new(
        author: &User,
        post_image: String,
        post_description: String,
        search_terms: Vec<String>,
    ) -> Self {
        Self {
            post_id: Uuid::new_v4(),
            user_id: author.user_id.clone(),
            username: author.username.clone(),
            user_image: author.image_url.clone(),
            post_image,
            post_description,
            time: now_millis(),
            likes: Vec::new(),
            search_terms,
        }
    }

    pub fn is_liked_by(&self, user_id: &str) -> bool {
        self.likes.iter().any(|id| id == user_id)
    }

    /// Liker set with `user_id` removed if present, appended otherwise.
    pub fn toggled_likes(&self, user_id: &str) -> Vec<UserId> {
        if self.is_liked_by(user_id) {
            self.likes
                .iter()
                .filter(|id| id.as_str() != user_id)
                .cloned()
                .collect()
        } else {
            let mut likes = self.likes.clone();
            likes.push(user_id.to_string());
            likes
        }
    }

    /// Sort newest first.
    pub fn sort_newest_first(posts: &mut [Post]) {
        posts.sort_by(|a, b| b.time.cmp(&a.time));
    }
}
