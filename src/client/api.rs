//! HTTP client for the sign-in endpoint.

use crate::auth::token::{decode_claims, Claims};
use crate::client::session::SessionStore;
use crate::client::store::{DurableError, DurableStore};
use crate::models::{LoginRequest, LoginResponse};
use reqwest::StatusCode;
use serde::Deserialize;

/// Sign-in failures as seen by the client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("User not found")]
    UserNotFound,

    #[error("Invalid password")]
    InvalidCredentials,

    #[error("Too many sign-in attempts, try again later")]
    RateLimited,

    #[error("Sign-in service unavailable ({0})")]
    Unavailable(StatusCode),

    #[error("Server returned an unreadable token")]
    MalformedToken,

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Could not persist session: {0}")]
    Storage(#[from] DurableError),
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

pub struct SignInClient {
    http: reqwest::Client,
    base_url: String,
}

impl SignInClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Exchange credentials for a token and store it in `session`.
    ///
    /// No retry on failure; the user decides whether to try again. A token
    /// the client cannot decode is never stored: the session is cleared and
    /// the attempt fails with [`ClientError::MalformedToken`].
    pub async fn sign_in<S: DurableStore>(
        &self,
        session: &mut SessionStore<S>,
        email: &str,
        password: &str,
    ) -> Result<Claims, ClientError> {
        let response = self
            .http
            .post(format!("{}/api/auth/login", self.base_url))
            .json(&LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            })
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let message = response
                .json::<ErrorBody>()
                .await
                .map(|body| body.error)
                .unwrap_or_default();
            return Err(match status {
                StatusCode::BAD_REQUEST => ClientError::InvalidRequest(message),
                StatusCode::NOT_FOUND => ClientError::UserNotFound,
                StatusCode::UNAUTHORIZED => ClientError::InvalidCredentials,
                StatusCode::TOO_MANY_REQUESTS => ClientError::RateLimited,
                other => ClientError::Unavailable(other),
            });
        }

        let LoginResponse { token } = response.json().await?;
        let claims = match decode_claims(&token) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::warn!(action = "session_cleared", reason = "malformed", error = %e, "Sign-in returned an unreadable token");
                session.clear()?;
                return Err(ClientError::MalformedToken);
            }
        };
        session.set(&token)?;

        tracing::info!(action = "signed_in", user_id = %claims.user_id, "Session stored");
        Ok(claims)
    }

    /// Drop the local session. Tokens are stateless, so nothing is sent.
    pub fn sign_out<S: DurableStore>(
        &self,
        session: &mut SessionStore<S>,
    ) -> Result<(), ClientError> {
        session.clear()?;
        tracing::info!(action = "signed_out", "Session cleared");
        Ok(())
    }
}
