//! JWT-backed session tokens.

use chrono::{TimeDelta, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use snapfeed_core::domain::UserId;
use snapfeed_core::ports::{AuthError, SessionTokenService};

const DEFAULT_SECRET: &str = "snapfeed-local-session";

/// Session token configuration.
#[derive(Debug, Clone)]
pub struct SessionTokenConfig {
    pub secret: String,
    pub ttl_hours: i64,
    pub issuer: String,
}

impl Default for SessionTokenConfig {
    fn default() -> Self {
        Self {
            secret: DEFAULT_SECRET.to_string(),
            ttl_hours: 24 * 30,
            issuer: "snapfeed".to_string(),
        }
    }
}

impl SessionTokenConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let secret = std::env::var("SESSION_SECRET").unwrap_or(defaults.secret);

        if secret == DEFAULT_SECRET {
            tracing::warn!("Using default session secret. Set SESSION_SECRET to override.");
        }

        Self {
            secret,
            ttl_hours: std::env::var("SESSION_TTL_HOURS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.ttl_hours),
            issuer: std::env::var("SESSION_ISSUER").unwrap_or(defaults.issuer),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: i64,
    iat: i64,
    iss: String,
}

/// Signs sessions as JWTs so a persisted token can be checked offline.
pub struct JwtSessionTokens {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    config: SessionTokenConfig,
}

impl JwtSessionTokens {
    pub fn new(config: SessionTokenConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            config,
        }
    }

    pub fn from_env() -> Self {
        Self::new(SessionTokenConfig::from_env())
    }
}

impl SessionTokenService for JwtSessionTokens {
    fn issue(&self, user_id: &str) -> Result<String, AuthError> {
        let now = Utc::now();
        let exp = now + TimeDelta::hours(self.config.ttl_hours);

        let claims = Claims {
            sub: user_id.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }

    fn validate(&self, token: &str) -> Result<UserId, AuthError> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.config.issuer]);

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::SessionExpired,
                _ => AuthError::InvalidToken(e.to_string()),
            }
        })?;

        Ok(data.claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(issuer: &str, ttl_hours: i64) -> SessionTokenConfig {
        SessionTokenConfig {
            secret: "test-secret".to_string(),
            ttl_hours,
            issuer: issuer.to_string(),
        }
    }

    #[test]
    fn test_issue_and_validate() {
        let tokens = JwtSessionTokens::new(config("test", 1));

        let token = tokens.issue("user-1").unwrap();

        assert_eq!(tokens.validate(&token).unwrap(), "user-1");
    }

    #[test]
    fn test_expired_token() {
        let tokens = JwtSessionTokens::new(config("test", -2));

        let token = tokens.issue("user-1").unwrap();

        assert!(matches!(
            tokens.validate(&token),
            Err(AuthError::SessionExpired)
        ));
    }

    #[test]
    fn test_wrong_issuer_rejected() {
        let issuer_a = JwtSessionTokens::new(config("a", 1));
        let issuer_b = JwtSessionTokens::new(config("b", 1));

        let token = issuer_a.issue("user-1").unwrap();

        assert!(matches!(
            issuer_b.validate(&token),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_garbage_token() {
        let tokens = JwtSessionTokens::new(config("test", 1));

        assert!(tokens.validate("garbage").is_err());
    }
}
