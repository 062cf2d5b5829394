//! Social graph: following and followers.

use std::sync::Arc;

use serde_json::{Map, Value};

use snapfeed_core::DomainError;
use snapfeed_core::domain::{User, fields};
use snapfeed_core::ports::{Collection, Filter};

use crate::context::EngineContext;
use crate::guard::Operation;

/// Follow graph operations for the signed-in user.
#[derive(Clone)]
pub struct SocialGraph {
    ctx: Arc<EngineContext>,
}

impl SocialGraph {
    pub(crate) fn new(ctx: Arc<EngineContext>) -> Self {
        Self { ctx }
    }

    /// Follow `target` or stop following it, then re-fetch the profile.
    ///
    /// The new list is derived from the loaded profile, so a session without
    /// one is rejected. The re-fetch is what updates `current_user`; if it
    /// fails the write stays and the error is reported.
    #[tracing::instrument(skip(self))]
    pub async fn toggle_follow(&self, target: &str) -> Result<User, DomainError> {
        let result = self.try_toggle_follow(target).await;
        self.ctx.finish(result)
    }

    async fn try_toggle_follow(&self, target: &str) -> Result<User, DomainError> {
        if target.is_empty() {
            return Err(DomainError::Validation("No user to follow".to_string()));
        }

        let _ticket = self.ctx.guard.try_begin(Operation::ToggleFollow)?;
        let me = self.ctx.require_profile("follow user").await?;
        if me.user_id == target {
            return Err(DomainError::Validation("You cannot follow yourself".to_string()));
        }

        let following = me.toggled_following(target);
        let mut update = Map::new();
        update.insert(
            fields::FOLLOWING.to_string(),
            Value::Array(following.into_iter().map(Value::String).collect()),
        );

        {
            let _progress = self.ctx.state.in_progress.begin();
            self.ctx
                .store
                .update(Collection::Users, &me.user_id, update)
                .await
                .map_err(|e| DomainError::remote("Not possible to follow user", e))?;
        }

        self.ctx.load_user(&me.user_id).await
    }

    /// Count the users following the signed-in user.
    #[tracing::instrument(skip(self))]
    pub async fn refresh_followers(&self) -> Result<usize, DomainError> {
        let result = self.try_refresh_followers().await;
        self.ctx.finish(result)
    }

    async fn try_refresh_followers(&self) -> Result<usize, DomainError> {
        let user_id = self.ctx.require_session("load followers").await?;

        let docs = self
            .ctx
            .store
            .query(
                Collection::Users,
                Filter::array_contains(fields::FOLLOWING, user_id),
            )
            .await
            .map_err(|e| DomainError::remote("Cannot load followers", e))?;

        let count = docs.len();
        self.ctx.state.followers.set(count);
        Ok(count)
    }
}
