/**
 * In-Memory User Store
 *
 * A `UserStore` backed by a `HashMap` behind an `RwLock`. Used by the test
 * suite, and as the fallback when no `DATABASE_URL` is configured so the
 * server can run without database features.
 *
 * Enforces the same uniqueness rules as the Postgres implementation so
 * handler behavior is identical against either store.
 */

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{Account, NewAccount, StoreError, UserStore};

/// In-memory account storage.
#[derive(Default)]
pub struct MemoryUserStore {
    accounts: RwLock<HashMap<Uuid, Account>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<Uuid, Account>> {
        self.accounts.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<Uuid, Account>> {
        self.accounts.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert(&self, new: NewAccount) -> Result<Account, StoreError> {
        let mut accounts = self.write();
        if accounts.values().any(|a| a.username == new.username) {
            return Err(StoreError::Duplicate { field: "username" });
        }
        if accounts.values().any(|a| a.email == new.email) {
            return Err(StoreError::Duplicate { field: "email" });
        }
        let account = Account::create(new);
        accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError> {
        Ok(self.read().get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, StoreError> {
        Ok(self
            .read()
            .values()
            .find(|a| a.username == username)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        Ok(self.read().values().find(|a| a.email == email).cloned())
    }

    async fn find_by_valid_reset_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Account>, StoreError> {
        Ok(self
            .read()
            .values()
            .find(|a| {
                a.reset_token.as_deref() == Some(token)
                    && a.reset_token_expiry.is_some_and(|expiry| expiry > now)
            })
            .cloned())
    }

    async fn update(&self, account: &Account) -> Result<(), StoreError> {
        let mut accounts = self.write();
        if accounts
            .values()
            .any(|a| a.id != account.id && a.username == account.username)
        {
            return Err(StoreError::Duplicate { field: "username" });
        }
        if accounts
            .values()
            .any(|a| a.id != account.id && a.email == account.email)
        {
            return Err(StoreError::Duplicate { field: "email" });
        }
        match accounts.get_mut(&account.id) {
            Some(existing) => {
                let mut replacement = account.clone();
                replacement.updated_at = Utc::now();
                *existing = replacement;
                Ok(())
            }
            None => Err(StoreError::NotFound),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.write().remove(&id).is_some())
    }
}
