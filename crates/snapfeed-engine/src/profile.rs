//! Profile manager: accounts, profile documents and profile images.

use std::sync::Arc;

use serde_json::Value;

use snapfeed_core::DomainError;
use snapfeed_core::domain::{Post, ProfilePatch, User, fields};
use snapfeed_core::ports::{Collection, FieldUpdate, Filter};

use crate::context::{EngineContext, encode};
use crate::guard::Operation;
use crate::posts::PostRepository;
use crate::upload::ImageUploader;

const FILL_ALL_FIELDS: &str = "Fill in all fields";

/// Account and profile operations.
#[derive(Clone)]
pub struct ProfileManager {
    ctx: Arc<EngineContext>,
}

impl ProfileManager {
    pub(crate) fn new(ctx: Arc<EngineContext>) -> Self {
        Self { ctx }
    }

    /// Create an account with a unique handle and its profile document.
    ///
    /// If the profile write fails after the credential was created, the
    /// credential is left behind and the provider session is dropped, so the
    /// UI never sees a signed-in user without a profile.
    #[tracing::instrument(skip(self, email, password))]
    pub async fn sign_up(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<User, DomainError> {
        let result = self.try_sign_up(username, email, password).await;
        self.ctx.finish(result)
    }

    async fn try_sign_up(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<User, DomainError> {
        const CONTEXT: &str = "Sign up failed";

        if username.is_empty() || email.is_empty() || password.is_empty() {
            return Err(DomainError::Validation(FILL_ALL_FIELDS.to_string()));
        }

        let _ticket = self.ctx.guard.try_begin(Operation::SignUp)?;
        let _progress = self.ctx.state.in_progress.begin();

        let taken = self
            .ctx
            .store
            .query(Collection::Users, Filter::eq(fields::USERNAME, username))
            .await
            .map_err(|e| DomainError::remote(CONTEXT, e))?;
        if !taken.is_empty() {
            return Err(DomainError::Conflict("username taken".to_string()));
        }

        self.ctx
            .auth
            .create_account(email, password)
            .await
            .map_err(|e| DomainError::remote(CONTEXT, e))?;

        match self.write_profile(ProfilePatch::username(username)).await {
            Ok(user) => {
                self.ctx.state.signed_in.set(true);
                tracing::info!(user_id = %user.user_id, "Signed up");
                Ok(user)
            }
            Err(err) => {
                tracing::error!(error = %err, "Credential created but profile write failed");
                self.ctx.force_sign_out().await;
                Err(err)
            }
        }
    }

    /// Authenticate and load the user's profile.
    ///
    /// The user counts as signed in only once the profile is loaded; if the
    /// load fails the provider session is dropped again.
    #[tracing::instrument(skip_all)]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<User, DomainError> {
        let result = self.try_sign_in(email, password).await;
        self.ctx.finish(result)
    }

    async fn try_sign_in(&self, email: &str, password: &str) -> Result<User, DomainError> {
        if email.is_empty() || password.is_empty() {
            return Err(DomainError::Validation(FILL_ALL_FIELDS.to_string()));
        }

        let _ticket = self.ctx.guard.try_begin(Operation::SignIn)?;
        let user_id = {
            let _progress = self.ctx.state.in_progress.begin();
            self.ctx
                .auth
                .sign_in(email, password)
                .await
                .map_err(|e| DomainError::remote("Sign in failed", e))?
        };

        match self.ctx.load_user(&user_id).await {
            Ok(user) => {
                self.ctx.state.signed_in.set(true);
                tracing::info!(user_id = %user.user_id, "Signed in");
                Ok(user)
            }
            Err(err) => {
                tracing::warn!(user_id = %user_id, error = %err, "Profile load failed, signing out");
                self.ctx.force_sign_out().await;
                Err(err)
            }
        }
    }

    /// Drop the session and everything loaded for it.
    #[tracing::instrument(skip(self))]
    pub async fn sign_out(&self) {
        self.ctx.force_sign_out().await;
        self.ctx.state.notify("Logged out");
        tracing::info!("Signed out");
    }

    /// Merge `patch` over the current profile and persist it. An empty patch
    /// returns the loaded profile without touching the store.
    #[tracing::instrument(skip(self))]
    pub async fn create_or_update_profile(&self, patch: ProfilePatch) -> Result<User, DomainError> {
        let result = self.guarded_profile_write(patch).await;
        self.ctx.finish(result)
    }

    /// Save the profile form.
    pub async fn update_profile_data(
        &self,
        name: &str,
        username: &str,
        bio: &str,
    ) -> Result<User, DomainError> {
        self.create_or_update_profile(ProfilePatch {
            name: Some(name.to_string()),
            username: Some(username.to_string()),
            bio: Some(bio.to_string()),
            image_url: None,
        })
        .await
    }

    async fn guarded_profile_write(&self, patch: ProfilePatch) -> Result<User, DomainError> {
        let _ticket = self.ctx.guard.try_begin(Operation::UpdateProfile)?;
        if patch.is_empty() {
            return self.ctx.require_profile("update profile").await;
        }
        self.write_profile(patch).await
    }

    async fn write_profile(&self, patch: ProfilePatch) -> Result<User, DomainError> {
        let user_id = self.ctx.require_session("update profile").await?;
        let current = self.ctx.profile_for(&user_id);
        let merged = patch.apply(&current);

        let _progress = self.ctx.state.in_progress.begin();

        if let Some(username) = &patch.username {
            if current.username.as_ref() != Some(username) {
                self.ensure_handle_free(&user_id, username).await?;
            }
        }

        let existing = self
            .ctx
            .store
            .get(Collection::Users, &user_id)
            .await
            .map_err(|e| DomainError::remote("Cannot create user", e))?;

        if existing.is_some() {
            self.ctx
                .store
                .update(Collection::Users, &user_id, patch.to_fields())
                .await
                .map_err(|e| DomainError::remote("Cannot update user", e))?;

            self.ctx.state.current_user.set(Some(merged.clone()));
            tracing::debug!(user_id = %user_id, "Profile updated");
            Ok(merged)
        } else {
            let body = encode(&merged, "Cannot create user")?;
            self.ctx
                .store
                .set(Collection::Users, &user_id, body)
                .await
                .map_err(|e| DomainError::remote("Cannot create user", e))?;

            tracing::debug!(user_id = %user_id, "Profile created");
            self.ctx.load_user(&user_id).await
        }
    }

    async fn ensure_handle_free(&self, user_id: &str, username: &str) -> Result<(), DomainError> {
        let holders = self
            .ctx
            .store
            .query(Collection::Users, Filter::eq(fields::USERNAME, username))
            .await
            .map_err(|e| DomainError::remote("Cannot update user", e))?;

        if holders.iter().any(|doc| doc.id != user_id) {
            return Err(DomainError::Conflict("username taken".to_string()));
        }
        Ok(())
    }

    /// Upload a new profile image, store it on the profile and push it onto
    /// every existing post by this user.
    ///
    /// A failed propagation is reported but the profile keeps the new image.
    #[tracing::instrument(skip_all, fields(size = blob.len()))]
    pub async fn upload_profile_image(&self, blob: Vec<u8>) -> Result<User, DomainError> {
        let result = self.try_upload_profile_image(blob).await;
        self.ctx.finish(result)
    }

    async fn try_upload_profile_image(&self, blob: Vec<u8>) -> Result<User, DomainError> {
        let _ticket = self.ctx.guard.try_begin(Operation::UploadProfileImage)?;

        let url = ImageUploader::new(self.ctx.clone()).upload(blob).await?;
        let user = self.write_profile(ProfilePatch::image_url(url.clone())).await?;

        if let Err(err) = self.try_propagate_user_image(&url).await {
            self.ctx.report(&err);
        }

        Ok(user)
    }

    /// Set `image_url` as the author image on all posts of the current user
    /// in one batch. Returns how many posts were rewritten.
    #[tracing::instrument(skip(self))]
    pub async fn propagate_user_image(&self, image_url: &str) -> Result<usize, DomainError> {
        let result = self.try_propagate_user_image(image_url).await;
        self.ctx.finish(result)
    }

    async fn try_propagate_user_image(&self, image_url: &str) -> Result<usize, DomainError> {
        const CONTEXT: &str = "Cannot update post images";

        let user_id = self.ctx.require_session("update post images").await?;

        let docs = self
            .ctx
            .store
            .query(Collection::Posts, Filter::eq(fields::USER_ID, user_id.as_str()))
            .await
            .map_err(|e| DomainError::remote(CONTEXT, e))?;

        let updates: Vec<FieldUpdate> = docs
            .into_iter()
            .filter(|doc| doc.decode::<Post>().is_ok())
            .map(|doc| FieldUpdate {
                id: doc.id,
                field: fields::USER_IMAGE.to_string(),
                value: Value::String(image_url.to_string()),
            })
            .collect();

        if updates.is_empty() {
            tracing::debug!(user_id = %user_id, "No posts to update");
            return Ok(0);
        }

        let count = updates.len();
        self.ctx
            .store
            .batch_update(Collection::Posts, updates)
            .await
            .map_err(|e| DomainError::remote(CONTEXT, e))?;
        tracing::info!(user_id = %user_id, count, "Author image propagated");

        let _ = PostRepository::new(self.ctx.clone()).refresh_my_posts().await;
        Ok(count)
    }
}
