//! Authentication implementations.

mod memory;

#[cfg(feature = "auth")]
mod password;
#[cfg(feature = "auth")]
mod session_token;

pub use memory::InMemoryAuthProvider;

#[cfg(feature = "auth")]
pub use password::{Argon2PasswordService, CredentialPolicy, DEFAULT_MIN_PASSWORD_LEN};
#[cfg(feature = "auth")]
pub use session_token::{JwtSessionTokens, SessionTokenConfig};
