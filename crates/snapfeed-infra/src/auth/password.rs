//! Credential policy and Argon2 password hashing.

use argon2::{
    Argon2,
    password_hash::{
        self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};

use snapfeed_core::ports::{AuthError, PasswordService};

/// Shortest password accepted when no policy is configured.
pub const DEFAULT_MIN_PASSWORD_LEN: usize = 6;

/// Rules a new account's credentials must satisfy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialPolicy {
    pub min_password_len: usize,
}

impl Default for CredentialPolicy {
    fn default() -> Self {
        Self {
            min_password_len: DEFAULT_MIN_PASSWORD_LEN,
        }
    }
}

impl CredentialPolicy {
    /// Load the policy from environment variables.
    pub fn from_env() -> Self {
        Self {
            min_password_len: std::env::var("PASSWORD_MIN_LENGTH")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_MIN_PASSWORD_LEN),
        }
    }

    fn check(&self, email: &str, password: &str) -> Result<(), AuthError> {
        // local@domain.tld, nothing fancier
        let valid_email = match email.trim().split_once('@') {
            Some((local, domain)) => {
                !local.is_empty()
                    && !domain.contains('@')
                    && domain.split('.').count() >= 2
                    && domain.split('.').all(|part| !part.is_empty())
            }
            None => false,
        };
        if !valid_email {
            return Err(AuthError::InvalidEmail);
        }

        if password.chars().count() < self.min_password_len {
            return Err(AuthError::WeakPassword(self.min_password_len));
        }
        Ok(())
    }
}

/// Argon2 hashing behind a [`CredentialPolicy`].
pub struct Argon2PasswordService {
    argon2: Argon2<'static>,
    policy: CredentialPolicy,
}

impl Argon2PasswordService {
    pub fn new(policy: CredentialPolicy) -> Self {
        Self {
            argon2: Argon2::default(),
            policy,
        }
    }

    pub fn from_env() -> Self {
        Self::new(CredentialPolicy::from_env())
    }

    pub fn policy(&self) -> &CredentialPolicy {
        &self.policy
    }
}

impl Default for Argon2PasswordService {
    fn default() -> Self {
        Self::new(CredentialPolicy::default())
    }
}

impl PasswordService for Argon2PasswordService {
    fn check_credentials(&self, email: &str, password: &str) -> Result<(), AuthError> {
        self.policy.check(email, password)
    }

    fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| AuthError::HashingError(e.to_string()))
    }

    /// A mismatch is `Ok(false)`; a stored hash that cannot be parsed or
    /// checked is an error, so a corrupted account does not read as a wrong
    /// password.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(hash).map_err(|e| AuthError::HashingError(e.to_string()))?;

        match self.argon2.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AuthError::HashingError(e.to_string())),
        }
    }
}
