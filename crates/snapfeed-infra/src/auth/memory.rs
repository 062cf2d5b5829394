//! In-memory authentication provider.
//!
//! Credentials live in a map keyed by email. The current session is a signed
//! token, so a token handed back through `restore_session` is checked the same
//! way a persisted one would be after an app restart.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use snapfeed_core::domain::UserId;
use snapfeed_core::ports::{AuthError, AuthProvider, PasswordService, SessionTokenService};

struct Account {
    user_id: UserId,
    password_hash: String,
}

/// Authentication provider backed by process memory.
pub struct InMemoryAuthProvider {
    accounts: RwLock<HashMap<String, Account>>,
    session: RwLock<Option<String>>,
    passwords: Arc<dyn PasswordService>,
    tokens: Arc<dyn SessionTokenService>,
}

impl InMemoryAuthProvider {
    pub fn new(passwords: Arc<dyn PasswordService>, tokens: Arc<dyn SessionTokenService>) -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
            session: RwLock::new(None),
            passwords,
            tokens,
        }
    }

    /// Argon2 hashing and JWT sessions configured from the environment.
    #[cfg(feature = "auth")]
    pub fn from_env() -> Self {
        Self::new(
            Arc::new(super::Argon2PasswordService::from_env()),
            Arc::new(super::JwtSessionTokens::from_env()),
        )
    }

    /// The raw token of the current session, for persisting across restarts.
    pub async fn session_token(&self) -> Option<String> {
        self.session.read().await.clone()
    }

    /// Install a previously persisted session token.
    pub async fn restore_session(&self, token: String) {
        *self.session.write().await = Some(token);
    }

    async fn start_session(&self, user_id: &str) -> Result<(), AuthError> {
        let token = self.tokens.issue(user_id)?;
        *self.session.write().await = Some(token);
        Ok(())
    }
}

#[async_trait]
impl AuthProvider for InMemoryAuthProvider {
    async fn current_session(&self) -> Option<UserId> {
        let session = self.session.read().await;
        let token = session.as_deref()?;

        match self.tokens.validate(token) {
            Ok(user_id) => Some(user_id),
            Err(e) => {
                tracing::debug!(error = %e, "Stored session rejected");
                None
            }
        }
    }

    async fn create_account(&self, email: &str, password: &str) -> Result<UserId, AuthError> {
        self.passwords.check_credentials(email, password)?;

        let key = email.trim().to_lowercase();
        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(&key) {
            return Err(AuthError::EmailTaken);
        }

        let account = Account {
            user_id: Uuid::new_v4().to_string(),
            password_hash: self.passwords.hash(password)?,
        };
        let user_id = account.user_id.clone();
        accounts.insert(key, account);
        drop(accounts);

        self.start_session(&user_id).await?;
        tracing::debug!(user_id = %user_id, "Account created");

        Ok(user_id)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<UserId, AuthError> {
        let user_id = {
            let accounts = self.accounts.read().await;
            let account = accounts
                .get(&email.trim().to_lowercase())
                .ok_or(AuthError::InvalidCredentials)?;

            if !self.passwords.verify(password, &account.password_hash)? {
                return Err(AuthError::InvalidCredentials);
            }
            account.user_id.clone()
        };

        self.start_session(&user_id).await?;
        tracing::debug!(user_id = %user_id, "Signed in");

        Ok(user_id)
    }

    async fn sign_out(&self) {
        *self.session.write().await = None;
    }
}
