//! Postgres-backed user lookup.
//!
//! Table: `usersandpayments.users` with columns `userid`, `firstname`,
//! `lastname`, `email`, `passwordhash`. Only the lookup query is issued;
//! schema and migrations are owned elsewhere.

use super::{StoreError, UserStore};
use crate::models::StoredUser;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

const FIND_BY_EMAIL: &str = "SELECT userid::text AS id, \
     COALESCE(firstname, '') AS first_name, \
     COALESCE(lastname, '') AS last_name, \
     email, \
     passwordhash AS password_hash \
     FROM usersandpayments.users WHERE email = $1";

/// User store over a shared Postgres connection pool.
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Build a lazily-connecting pool.
    ///
    /// No connection is opened until the first lookup, so a database outage
    /// at startup surfaces as `Unavailable` on sign-in rather than a crash.
    pub fn connect_lazy(
        database_url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect_lazy(database_url)?;
        Ok(Self::new(pool))
    }
}

#[async_trait::async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<StoredUser>, StoreError> {
        let user = sqlx::query_as::<_, StoredUser>(FIND_BY_EMAIL)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }
}
