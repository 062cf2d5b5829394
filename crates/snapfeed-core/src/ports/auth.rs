//! Authentication ports.

use async_trait::async_trait;

use crate::domain::UserId;

/// Authentication provider - owns credentials and the current session.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// The signed-in user id, if a valid session exists. Local check, no network.
    async fn current_session(&self) -> Option<UserId>;

    /// Create a credential and sign it in.
    async fn create_account(&self, email: &str, password: &str) -> Result<UserId, AuthError>;

    /// Authenticate an existing credential.
    async fn sign_in(&self, email: &str, password: &str) -> Result<UserId, AuthError>;

    /// Drop the current session. Never fails.
    async fn sign_out(&self);
}

/// Credential policy and password hashing.
pub trait PasswordService: Send + Sync {
    /// Check an email/password pair against the account policy before an
    /// account is created.
    fn check_credentials(&self, email: &str, password: &str) -> Result<(), AuthError>;

    /// Hash a plain text password.
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// Verify a password against a hash.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;
}

/// Issues and checks the token that represents a persisted session.
pub trait SessionTokenService: Send + Sync {
    /// Issue a session token for a user.
    fn issue(&self, user_id: &str) -> Result<String, AuthError>;

    /// Validate a token and return the user it belongs to.
    fn validate(&self, token: &str) -> Result<UserId, AuthError>;
}

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid email address")]
    InvalidEmail,

    #[error("Email already registered")]
    EmailTaken,

    #[error("Password must be at least {0} characters")]
    WeakPassword(usize),

    #[error("Session expired")]
    SessionExpired,

    #[error("Invalid session token: {0}")]
    InvalidToken(String),

    #[error("Hashing error: {0}")]
    HashingError(String),

    #[error("Provider unavailable: {0}")]
    Unavailable(String),
}
