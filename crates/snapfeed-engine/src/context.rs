//! Shared handles every component works through.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use snapfeed_core::DomainError;
use snapfeed_core::domain::{User, UserId};
use snapfeed_core::ports::{AuthProvider, BlobStorage, Collection, DocumentStore};

use crate::config::EngineConfig;
use crate::feed::FeedComposer;
use crate::guard::OperationGuard;
use crate::posts::PostRepository;
use crate::social::SocialGraph;
use crate::state::AppState;

pub(crate) struct EngineContext {
    pub(crate) auth: Arc<dyn AuthProvider>,
    pub(crate) store: Arc<dyn DocumentStore>,
    pub(crate) blobs: Arc<dyn BlobStorage>,
    pub(crate) state: AppState,
    pub(crate) config: EngineConfig,
    pub(crate) guard: OperationGuard,
}

impl EngineContext {
    pub(crate) fn new(
        auth: Arc<dyn AuthProvider>,
        store: Arc<dyn DocumentStore>,
        blobs: Arc<dyn BlobStorage>,
        config: EngineConfig,
    ) -> Self {
        Self {
            auth,
            store,
            blobs,
            state: AppState::new(),
            guard: OperationGuard::new(config.reentrancy_guard),
            config,
        }
    }

    /// Surface a failed operation as a notification; pass the result through.
    pub(crate) fn finish<T>(&self, result: Result<T, DomainError>) -> Result<T, DomainError> {
        if let Err(err) = &result {
            self.report(err);
        }
        result
    }

    pub(crate) fn report(&self, err: &DomainError) {
        match err {
            DomainError::Remote { .. } | DomainError::Auth(_) => {
                tracing::warn!(error = %err, "Operation failed")
            }
            _ => tracing::debug!(error = %err, "Operation rejected"),
        }
        self.state.notify(err.to_string());
    }

    /// The signed-in user id. A missing session where one is required is
    /// treated as corrupt state and signs the user out.
    pub(crate) async fn require_session(&self, action: &str) -> Result<UserId, DomainError> {
        match self.auth.current_session().await {
            Some(user_id) => Ok(user_id),
            None => {
                tracing::warn!(action, "No session, forcing sign out");
                self.force_sign_out().await;
                Err(DomainError::Auth(format!(
                    "No signed-in user. Unable to {action}."
                )))
            }
        }
    }

    /// The signed-in user's loaded profile. A session without one is treated
    /// like a missing session.
    pub(crate) async fn require_profile(&self, action: &str) -> Result<User, DomainError> {
        let user_id = self.require_session(action).await?;
        match self.state.current_user.get() {
            Some(user) if user.user_id == user_id => Ok(user),
            _ => {
                tracing::warn!(action, user_id = %user_id, "Profile not loaded, forcing sign out");
                self.force_sign_out().await;
                Err(DomainError::Auth(format!(
                    "Profile not loaded. Unable to {action}."
                )))
            }
        }
    }

    pub(crate) async fn force_sign_out(&self) {
        self.auth.sign_out().await;
        self.state.clear_session();
    }

    /// Profile used for denormalized fields; falls back to a bare id.
    pub(crate) fn profile_for(&self, user_id: &str) -> User {
        self.state
            .current_user
            .get()
            .filter(|user| user.user_id == user_id)
            .unwrap_or_else(|| User::new(user_id))
    }

    /// Fetch the user document into session state, then refresh everything
    /// derived from it.
    pub(crate) async fn load_user(self: &Arc<Self>, user_id: &str) -> Result<User, DomainError> {
        const CONTEXT: &str = "Cannot retrieve user data";

        let user = {
            let _progress = self.state.in_progress.begin();
            let doc = self
                .store
                .get(Collection::Users, user_id)
                .await
                .map_err(|e| DomainError::remote(CONTEXT, e))?
                .ok_or_else(|| DomainError::remote(CONTEXT, format!("no profile for {user_id}")))?;

            let mut user: User = doc.decode().map_err(|e| DomainError::remote(CONTEXT, e))?;
            user.user_id = doc.id;
            user
        };

        self.state.current_user.set(Some(user.clone()));
        tracing::debug!(user_id = %user.user_id, "User loaded");

        // Each refresh reports its own failure
        let posts = PostRepository::new(self.clone());
        let feed = FeedComposer::new(self.clone());
        let social = SocialGraph::new(self.clone());
        let _ = futures::join!(
            posts.refresh_my_posts(),
            feed.get_personalized_feed(),
            social.refresh_followers(),
        );

        Ok(user)
    }
}

/// Serialize an entity into a document body.
pub(crate) fn encode<T: Serialize>(value: &T, context: &str) -> Result<Value, DomainError> {
    serde_json::to_value(value).map_err(|e| DomainError::remote(context, e))
}
