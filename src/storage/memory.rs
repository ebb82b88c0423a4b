//! In-process user store for tests and local demos.

use super::{StoreError, UserStore};
use crate::models::StoredUser;
use std::collections::HashMap;
use std::sync::RwLock;

/// Users keyed by exact email.
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<String, StoredUser>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with_user(self, user: StoredUser) -> Self {
        self.insert(user);
        self
    }

    /// Insert or replace the record for `user.email`.
    pub fn insert(&self, user: StoredUser) {
        let mut users = self.users.write().unwrap_or_else(|e| e.into_inner());
        users.insert(user.email.clone(), user);
    }
}

#[async_trait::async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<StoredUser>, StoreError> {
        let users = self.users.read().unwrap_or_else(|e| e.into_inner());
        Ok(users.get(email).cloned())
    }
}
