//! Post repository: creating posts, the user's own post list, search and likes.

use std::sync::Arc;

use serde_json::{Map, Value};

use snapfeed_core::DomainError;
use snapfeed_core::domain::{Post, fields, normalize_term, tokenize};
use snapfeed_core::ports::{Collection, Document, Filter};

use crate::context::{EngineContext, encode};
use crate::guard::Operation;
use crate::upload::ImageUploader;

/// Decode query results into posts, newest first. Malformed documents are skipped.
pub(crate) fn decode_posts(docs: Vec<Document>) -> Vec<Post> {
    let mut posts: Vec<Post> = docs
        .iter()
        .filter_map(|doc| match doc.decode::<Post>() {
            Ok(post) => Some(post),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping malformed post");
                None
            }
        })
        .collect();
    Post::sort_newest_first(&mut posts);
    posts
}

/// Post operations.
#[derive(Clone)]
pub struct PostRepository {
    ctx: Arc<EngineContext>,
}

impl PostRepository {
    pub(crate) fn new(ctx: Arc<EngineContext>) -> Self {
        Self { ctx }
    }

    /// Upload the image, then write a post for it.
    ///
    /// `on_posted` runs after the post is stored and the user's post list has
    /// been refreshed.
    #[tracing::instrument(skip(self, image, on_posted), fields(size = image.len()))]
    pub async fn create_post<F>(
        &self,
        image: Vec<u8>,
        caption: &str,
        on_posted: F,
    ) -> Result<Post, DomainError>
    where
        F: FnOnce(&Post) + Send,
    {
        let result = self.try_create_post(image, caption).await;
        let post = self.ctx.finish(result)?;
        on_posted(&post);
        Ok(post)
    }

    async fn try_create_post(&self, image: Vec<u8>, caption: &str) -> Result<Post, DomainError> {
        let _ticket = self.ctx.guard.try_begin(Operation::CreatePost)?;
        let user_id = self.ctx.require_session("create post").await?;

        let image_url = ImageUploader::new(self.ctx.clone()).upload(image).await?;

        let author = self.ctx.profile_for(&user_id);
        let search_terms = tokenize(caption, &self.ctx.config.filler_words);
        let post = Post::new(&author, image_url, caption.to_string(), search_terms);

        {
            let _progress = self.ctx.state.in_progress.begin();
            let body = encode(&post, "Unable to create post")?;
            self.ctx
                .store
                .set(Collection::Posts, &post.post_id.to_string(), body)
                .await
                .map_err(|e| DomainError::remote("Unable to create post", e))?;
        }

        self.ctx.state.notify("Post successfully created");
        tracing::info!(post_id = %post.post_id, terms = post.search_terms.len(), "Post created");

        let _ = self.refresh_my_posts().await;
        Ok(post)
    }

    /// Reload the signed-in user's posts, newest first.
    #[tracing::instrument(skip(self))]
    pub async fn refresh_my_posts(&self) -> Result<Vec<Post>, DomainError> {
        let result = self.try_refresh_my_posts().await;
        self.ctx.finish(result)
    }

    async fn try_refresh_my_posts(&self) -> Result<Vec<Post>, DomainError> {
        let user_id = self.ctx.require_session("refresh posts").await?;
        let _loading = self.ctx.state.posts_loading.begin();

        let docs = self
            .ctx
            .store
            .query(Collection::Posts, Filter::eq(fields::USER_ID, user_id))
            .await
            .map_err(|e| DomainError::remote("Cannot fetch posts", e))?;

        let posts = decode_posts(docs);
        self.ctx.state.posts.set(posts.clone());
        Ok(posts)
    }

    /// Posts whose caption contains `term` as a whole token.
    ///
    /// Blank input leaves the current results untouched and returns them.
    #[tracing::instrument(skip(self))]
    pub async fn search_posts(&self, term: &str) -> Result<Vec<Post>, DomainError> {
        let Some(term) = normalize_term(term) else {
            return Ok(self.ctx.state.searched_posts.get());
        };
        let result = self.try_search_posts(term).await;
        self.ctx.finish(result)
    }

    async fn try_search_posts(&self, term: String) -> Result<Vec<Post>, DomainError> {
        let _loading = self.ctx.state.search_loading.begin();

        let docs = self
            .ctx
            .store
            .query(
                Collection::Posts,
                Filter::array_contains(fields::SEARCH_TERMS, term),
            )
            .await
            .map_err(|e| DomainError::remote("Cannot search posts", e))?;

        let posts = decode_posts(docs);
        self.ctx.state.searched_posts.set(posts.clone());
        Ok(posts)
    }

    /// Like or unlike `post` as the signed-in user.
    ///
    /// `post` and every cached copy of it change only after the store has
    /// accepted the new liker set.
    #[tracing::instrument(skip(self, post), fields(post_id = %post.post_id))]
    pub async fn toggle_like(&self, post: &mut Post) -> Result<(), DomainError> {
        let result = self.try_toggle_like(post).await;
        self.ctx.finish(result)
    }

    async fn try_toggle_like(&self, post: &mut Post) -> Result<(), DomainError> {
        let _ticket = self.ctx.guard.try_begin(Operation::ToggleLike)?;
        let user_id = self.ctx.require_session("like post").await?;

        let likes = post.toggled_likes(&user_id);
        let mut update = Map::new();
        update.insert(
            fields::LIKES.to_string(),
            Value::Array(likes.iter().cloned().map(Value::String).collect()),
        );

        self.ctx
            .store
            .update(Collection::Posts, &post.post_id.to_string(), update)
            .await
            .map_err(|e| DomainError::remote("Unable to like post", e))?;

        post.likes = likes;
        self.ctx.state.apply_likes(post);
        Ok(())
    }
}
