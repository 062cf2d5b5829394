use std::sync::Arc;

use snapfeed_core::DomainError;
use snapfeed_core::domain::User;
use snapfeed_core::ports::{AuthProvider, BlobStorage, DocumentStore};

use crate::comments::CommentRepository;
use crate::config::EngineConfig;
use crate::context::EngineContext;
use crate::feed::FeedComposer;
use crate::posts::PostRepository;
use crate::profile::ProfileManager;
use crate::social::SocialGraph;
use crate::state::AppState;

/// Entry point for the presentation layer.
///
/// Owns the collaborators and the [`AppState`]; component handles are cheap
/// to create and all share the same state.
#[derive(Clone)]
pub struct Engine {
    ctx: Arc<EngineContext>,
}

impl Engine {
    pub fn new(
        auth: Arc<dyn AuthProvider>,
        store: Arc<dyn DocumentStore>,
        blobs: Arc<dyn BlobStorage>,
        config: EngineConfig,
    ) -> Self {
        Self {
            ctx: Arc::new(EngineContext::new(auth, store, blobs, config)),
        }
    }

    /// Restore an existing session, if the provider has one.
    ///
    /// With a session the profile, own posts, feed and follower count are
    /// loaded. Without one nothing else is called. A session whose profile
    /// cannot be loaded is dropped.
    #[tracing::instrument(skip(self))]
    pub async fn start(&self) -> Result<Option<User>, DomainError> {
        let Some(user_id) = self.ctx.auth.current_session().await else {
            self.ctx.state.signed_in.set(false);
            tracing::info!("No existing session");
            return Ok(None);
        };

        tracing::info!(user_id = %user_id, "Restoring session");

        let result = match self.ctx.load_user(&user_id).await {
            Ok(user) => {
                self.ctx.state.signed_in.set(true);
                Ok(Some(user))
            }
            Err(err) => {
                self.ctx.force_sign_out().await;
                Err(err)
            }
        };
        self.ctx.finish(result)
    }

    pub fn state(&self) -> &AppState {
        &self.ctx.state
    }

    pub fn config(&self) -> &EngineConfig {
        &self.ctx.config
    }

    pub fn profiles(&self) -> ProfileManager {
        ProfileManager::new(self.ctx.clone())
    }

    pub fn posts(&self) -> PostRepository {
        PostRepository::new(self.ctx.clone())
    }

    pub fn feed(&self) -> FeedComposer {
        FeedComposer::new(self.ctx.clone())
    }

    pub fn social(&self) -> SocialGraph {
        SocialGraph::new(self.ctx.clone())
    }

    pub fn comments(&self) -> CommentRepository {
        CommentRepository::new(self.ctx.clone())
    }
}
