//! Email/password credential check and token issuance.

use crate::auth::password::{verify_password, PasswordError};
use crate::auth::token::{SessionToken, TokenError, TokenSigner};
use crate::error::AppError;
use crate::storage::{StoreError, UserStore};

/// Why a sign-in attempt failed.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Email and password are required")]
    InvalidRequest,

    #[error("User not found")]
    UserNotFound,

    #[error("Invalid password")]
    InvalidCredentials,

    #[error("Authentication backend unavailable: {0}")]
    Unavailable(String),

    #[error("Authentication failed internally: {0}")]
    Internal(String),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        AuthError::Unavailable(err.to_string())
    }
}

impl From<PasswordError> for AuthError {
    fn from(err: PasswordError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidRequest => AppError::InvalidRequest(err.to_string()),
            AuthError::UserNotFound => AppError::UserNotFound,
            AuthError::InvalidCredentials => AppError::InvalidCredentials,
            AuthError::Unavailable(msg) => AppError::Unavailable(msg),
            AuthError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

/// Check `email`/`password` against the user store and issue a token.
///
/// Performs a single read. Nothing is retried: a store failure is returned
/// as [`AuthError::Unavailable`] for the caller to surface.
pub async fn verify_credentials(
    users: &dyn UserStore,
    signer: &TokenSigner,
    email: &str,
    password: &str,
) -> Result<SessionToken, AuthError> {
    if email.is_empty() || password.is_empty() {
        return Err(AuthError::InvalidRequest);
    }

    let user = users
        .find_by_email(email)
        .await?
        .ok_or(AuthError::UserNotFound)?;

    // bcrypt and Argon2 are deliberately slow; keep them off the async workers
    let password = zeroize::Zeroizing::new(password.to_string());
    let stored_hash = user.password_hash.clone();
    let valid = tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
        .await
        .map_err(|e| AuthError::Internal(format!("password check aborted: {}", e)))??;

    if !valid {
        return Err(AuthError::InvalidCredentials);
    }

    Ok(signer.issue(&user)?)
}
