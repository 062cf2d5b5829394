//! Re-entrancy guard for mutating operations.
//!
//! At most one operation of each kind runs at a time. A second "create post"
//! issued while the first is still uploading is rejected with
//! [`DomainError::Busy`] instead of writing a duplicate post.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use snapfeed_core::DomainError;

/// Mutating operations the guard keys on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    SignUp,
    SignIn,
    UpdateProfile,
    UploadProfileImage,
    CreatePost,
    ToggleLike,
    ToggleFollow,
    AddComment,
}

impl Operation {
    pub fn label(&self) -> &'static str {
        match self {
            Operation::SignUp => "Sign up",
            Operation::SignIn => "Sign in",
            Operation::UpdateProfile => "Profile update",
            Operation::UploadProfileImage => "Profile image upload",
            Operation::CreatePost => "Post creation",
            Operation::ToggleLike => "Like",
            Operation::ToggleFollow => "Follow",
            Operation::AddComment => "Comment",
        }
    }
}

#[derive(Debug)]
pub(crate) struct OperationGuard {
    enabled: bool,
    in_flight: Mutex<HashSet<Operation>>,
}

impl OperationGuard {
    pub(crate) fn new(enabled: bool) -> Self {
        Self {
            enabled,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    pub(crate) fn try_begin(&self, op: Operation) -> Result<OperationTicket<'_>, DomainError> {
        if !self.enabled {
            return Ok(OperationTicket { guard: self, op: None });
        }

        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if !in_flight.insert(op) {
            tracing::debug!(operation = ?op, "Rejected concurrent invocation");
            return Err(DomainError::Busy(op.label()));
        }

        Ok(OperationTicket {
            guard: self,
            op: Some(op),
        })
    }

    fn release(&self, op: Operation) {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&op);
    }
}

/// Held for the duration of an operation; releases its slot on drop.
#[must_use = "the operation slot is released as soon as the ticket is dropped"]
pub(crate) struct OperationTicket<'a> {
    guard: &'a OperationGuard,
    op: Option<Operation>,
}

impl Drop for OperationTicket<'_> {
    fn drop(&mut self) {
        if let Some(op) = self.op {
            self.guard.release(op);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_invocation_is_busy() {
        let guard = OperationGuard::new(true);

        let first = guard.try_begin(Operation::CreatePost).unwrap();
        let second = guard.try_begin(Operation::CreatePost);
        assert_eq!(second.err(), Some(DomainError::Busy("Post creation")));

        // other kinds are independent
        assert!(guard.try_begin(Operation::ToggleLike).is_ok());

        drop(first);
        assert!(guard.try_begin(Operation::CreatePost).is_ok());
    }

    #[test]
    fn test_disabled_guard_admits_everything() {
        let guard = OperationGuard::new(false);

        let _first = guard.try_begin(Operation::CreatePost).unwrap();
        assert!(guard.try_begin(Operation::CreatePost).is_ok());
    }
}
