//! # Snapfeed Infrastructure
//!
//! Concrete implementations of the ports defined in `snapfeed-core`.
//! Everything here keeps its data in process memory, which makes it the
//! backend for local runs and for the engine's tests.
//!
//! ## Feature Flags
//!
//! - `auth` (default) - Argon2 password hashing and JWT session tokens
//! - `minimal` - No hashing or token crates

pub mod auth;
pub mod blob;
pub mod store;

pub use auth::InMemoryAuthProvider;
pub use blob::InMemoryBlobStorage;
pub use store::InMemoryDocumentStore;

#[cfg(feature = "auth")]
pub use auth::{Argon2PasswordService, CredentialPolicy, JwtSessionTokens, SessionTokenConfig};
