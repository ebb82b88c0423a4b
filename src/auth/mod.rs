//! Credential verification, password hashing and signed session tokens.

pub mod middleware;
pub mod password;
pub mod token;
pub mod verify;

pub use middleware::{check_rate_limit, AppState, AuthSession, ClientIp};
pub use password::{hash_password, verify_password};
pub use token::{decode_claims, Claims, SessionToken, TokenError, TokenSigner};
pub use verify::{verify_credentials, AuthError};
