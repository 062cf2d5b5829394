//! Feed composer: posts from followed users, or recent posts from everyone.

use std::sync::Arc;

use snapfeed_core::DomainError;
use snapfeed_core::domain::{Post, fields, now_millis};
use snapfeed_core::ports::{Collection, Filter};

use crate::context::EngineContext;
use crate::posts::decode_posts;

/// Builds the feed shown on the home screen.
#[derive(Clone)]
pub struct FeedComposer {
    ctx: Arc<EngineContext>,
}

impl FeedComposer {
    pub(crate) fn new(ctx: Arc<EngineContext>) -> Self {
        Self { ctx }
    }

    /// Posts by followed users; the general feed when there are none.
    ///
    /// `feed_loading` stays up across the fallback, so observers see one
    /// loading period and one published result.
    #[tracing::instrument(skip(self))]
    pub async fn get_personalized_feed(&self) -> Result<Vec<Post>, DomainError> {
        let result = self.try_personalized_feed().await;
        self.ctx.finish(result)
    }

    async fn try_personalized_feed(&self) -> Result<Vec<Post>, DomainError> {
        let _loading = self.ctx.state.feed_loading.begin();

        let following = self
            .ctx
            .state
            .current_user
            .get()
            .map(|user| user.following)
            .unwrap_or_default();

        if !following.is_empty() {
            let docs = self
                .ctx
                .store
                .query(Collection::Posts, Filter::is_in(fields::USER_ID, following))
                .await
                .map_err(|e| DomainError::remote("Cannot get personalized feed", e))?;

            let posts = decode_posts(docs);
            if !posts.is_empty() {
                self.ctx.state.feed_posts.set(posts.clone());
                return Ok(posts);
            }
        }

        tracing::debug!("Personalized feed empty, using general feed");
        self.load_general_feed().await
    }

    /// Every post created inside the feed window, newest first.
    #[tracing::instrument(skip(self))]
    pub async fn get_general_feed(&self) -> Result<Vec<Post>, DomainError> {
        let result = {
            let _loading = self.ctx.state.feed_loading.begin();
            self.load_general_feed().await
        };
        self.ctx.finish(result)
    }

    async fn load_general_feed(&self) -> Result<Vec<Post>, DomainError> {
        let since = now_millis() - self.ctx.config.feed_window.num_milliseconds();

        let docs = self
            .ctx
            .store
            .query(Collection::Posts, Filter::greater_than(fields::TIME, since))
            .await
            .map_err(|e| DomainError::remote("Not possible to get general feed", e))?;

        let posts = decode_posts(docs);
        self.ctx.state.feed_posts.set(posts.clone());
        Ok(posts)
    }
}
