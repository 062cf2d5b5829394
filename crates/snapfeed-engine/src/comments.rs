//! Comment repository.

use std::sync::Arc;

use uuid::Uuid;

use snapfeed_core::DomainError;
use snapfeed_core::domain::{Comment, fields};
use snapfeed_core::ports::{Collection, Filter};

use crate::context::{EngineContext, encode};
use crate::guard::Operation;

#[derive(Clone)]
pub struct CommentRepository {
    ctx: Arc<EngineContext>,
}

impl CommentRepository {
    pub(crate) fn new(ctx: Arc<EngineContext>) -> Self {
        Self { ctx }
    }

    /// Load every comment on `post_id`, oldest first, replacing the published list.
    #[tracing::instrument(skip(self))]
    pub async fn get_comments(&self, post_id: Uuid) -> Result<Vec<Comment>, DomainError> {
        let result = self.try_get_comments(post_id).await;
        self.ctx.finish(result)
    }

    async fn try_get_comments(&self, post_id: Uuid) -> Result<Vec<Comment>, DomainError> {
        let _loading = self.ctx.state.comments_loading.begin();

        let docs = self
            .ctx
            .store
            .query(
                Collection::Comments,
                Filter::eq(fields::POST_ID, post_id.to_string()),
            )
            .await
            .map_err(|e| DomainError::remote("Cannot load comments", e))?;

        let mut comments = Vec::with_capacity(docs.len());
        for doc in &docs {
            match doc.decode::<Comment>() {
                Ok(comment) => comments.push(comment),
                Err(e) => tracing::warn!(error = %e, "Skipping malformed comment"),
            }
        }
        Comment::sort_oldest_first(&mut comments);

        self.ctx.state.comments.set(comments.clone());
        Ok(comments)
    }

    #[tracing::instrument(skip(self, text))]
    pub async fn add_comment(&self, post_id: Uuid, text: &str) -> Result<Comment, DomainError> {
        let result = self.try_add_comment(post_id, text).await;
        self.ctx.finish(result)
    }

    async fn try_add_comment(&self, post_id: Uuid, text: &str) -> Result<Comment, DomainError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(DomainError::Validation("Comment cannot be empty".to_string()));
        }

        let _ticket = self.ctx.guard.try_begin(Operation::AddComment)?;
        let user_id = self.ctx.require_session("comment").await?;
        let author = self.ctx.profile_for(&user_id);
        let comment = Comment::new(post_id, author.username, text.to_string());

        {
            let _progress = self.ctx.state.in_progress.begin();
            let body = encode(&comment, "Unable to add comment")?;
            self.ctx
                .store
                .set(Collection::Comments, &comment.comment_id.to_string(), body)
                .await
                .map_err(|e| DomainError::remote("Unable to add comment", e))?;
        }
        tracing::debug!(comment_id = %comment.comment_id, "Comment added");

        let _ = self.get_comments(post_id).await;
        Ok(comment)
    }
}
