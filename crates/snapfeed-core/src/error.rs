//! Domain-level error types.

use std::fmt::Display;

use thiserror::Error;

/// Domain errors - every failure an engine operation can surface.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// A required input was empty. Raised before any remote call.
    #[error("{0}")]
    Validation(String),

    /// The requested handle is already taken.
    #[error("{0}")]
    Conflict(String),

    /// No usable session where one is required.
    #[error("{0}")]
    Auth(String),

    /// A collaborator call failed.
    #[error("{context}: {message}")]
    Remote { context: String, message: String },

    /// The same kind of operation is already in flight.
    #[error("{0} already in progress")]
    Busy(&'static str),
}

impl DomainError {
    /// Wrap a collaborator failure with the intent it interrupted.
    pub fn remote(context: impl Into<String>, err: impl Display) -> Self {
        Self::Remote {
            context: context.into(),
            message: err.to_string(),
        }
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }
}
