//! User lookup for credential checks.
//!
//! The verifier only ever needs one query, "fetch user by email", so the
//! persistence layer is hidden behind [`UserStore`]. Production uses the
//! Postgres users table; tests and local demos use the in-memory store.

pub mod memory;
pub mod postgres;

pub use memory::MemoryUserStore;
pub use postgres::PgUserStore;

use crate::models::StoredUser;

/// Error type for user lookups.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("User store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

/// Read-only access to persisted user records.
#[async_trait::async_trait]
pub trait UserStore: Send + Sync {
    /// Fetch the user whose email matches exactly.
    ///
    /// Matching follows the backing store's collation; both bundled stores
    /// compare case-sensitively.
    async fn find_by_email(&self, email: &str) -> Result<Option<StoredUser>, StoreError>;
}
