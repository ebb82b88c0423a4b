//! Auth API endpoints.

use crate::auth::middleware::{limit_login_attempts, AppState, AuthSession, ClientIp};
use crate::auth::verify::{verify_credentials, AuthError};
use crate::error::AppError;
use crate::models::{LoginRequest, LoginResponse, SessionResponse};
use axum::{
    extract::{rejection::JsonRejection, State},
    response::IntoResponse,
    Json,
};

/// POST /api/auth/login - Verify email/password and issue a session token
pub async fn login(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    limit_login_attempts(&state, ip).await?;

    let Json(req) = body.map_err(|e| {
        tracing::debug!(action = "auth_invalid_request", error = %e, "Rejected login body");
        AppError::from(AuthError::InvalidRequest)
    })?;

    let issued = match verify_credentials(
        state.users.as_ref(),
        &state.signer,
        &req.email,
        &req.password,
    )
    .await
    {
        Ok(issued) => issued,
        Err(e) => {
            match &e {
                AuthError::UserNotFound | AuthError::InvalidCredentials => {
                    tracing::warn!(action = "auth_failed", reason = %e, "Login rejected");
                }
                AuthError::InvalidRequest => {
                    tracing::debug!(action = "auth_invalid_request", reason = %e, "Login rejected");
                }
                AuthError::Unavailable(_) | AuthError::Internal(_) => {
                    tracing::error!(action = "auth_error", error = %e, "Login failed");
                }
            }
            return Err(e.into());
        }
    };

    tracing::info!(
        action = "auth_success",
        user_id = %issued.claims.user_id,
        expires_at = issued.claims.exp,
        "User authenticated"
    );

    Ok(Json(LoginResponse {
        token: issued.token,
    }))
}

/// GET /api/auth/session - Describe the session behind a bearer token
pub async fn session(session: AuthSession) -> Result<impl IntoResponse, AppError> {
    Ok(Json(SessionResponse {
        user: session.claims.user(),
        expires_at: session.claims.exp,
    }))
}
