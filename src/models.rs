//! Request and response models for the API.
//!
//! All models use serde for serialization/deserialization.
//! `StoredUser` mirrors a row of the users table.

use serde::{Deserialize, Serialize};

// ============================================================================
// Auth Models
// ============================================================================

/// Sign-in request body.
///
/// Both fields default to empty so that a body missing either one reaches
/// the credential check and is rejected with a 400 there.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Response after a successful sign-in.
#[derive(Debug, Deserialize, Serialize)]
pub struct LoginResponse {
    pub token: String,
}

/// Public identity carried by a session token.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// Response for a server-side session check.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub user: UserInfo,
    pub expires_at: u64,
}

// ============================================================================
// Storage Models
// ============================================================================

/// User record as read from the users table.
///
/// Created out-of-band; this crate only reads it.
#[derive(Clone, sqlx::FromRow)]
pub struct StoredUser {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
}

impl std::fmt::Debug for StoredUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredUser")
            .field("id", &self.id)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .field("password_hash", &"[REDACTED]")
            .finish()
    }
}

/// Current UNIX time in seconds.
pub fn now_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
