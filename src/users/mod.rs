//! User Accounts
//!
//! The `Account` record, the closed `Role` enumeration, and the `UserStore`
//! trait every component persists accounts through.
//!
//! # Architecture
//!
//! - **`mod.rs`** - Account model, Role, `StoreError`, the `UserStore` trait
//! - **`postgres`** - sqlx/Postgres implementation
//! - **`memory`** - in-memory implementation (tests, and the fallback when
//!   no database is configured)
//!
//! # Invariants
//!
//! - `username` and `email` are each globally unique; both implementations
//!   surface violations as `StoreError::Duplicate` naming the field.
//! - The password field always holds a bcrypt hash, never plaintext.
//! - `reset_token` and `reset_token_expiry` are set and cleared together.
//!
//! One `Role` enumeration is shared by registration validation, token
//! claims, and the access-control gate, so a role can never be admitted in
//! one place and rejected in another.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub mod memory;
pub mod postgres;

pub use memory::MemoryUserStore;
pub use postgres::PgUserStore;

/// Closed set of account roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
    Viewer,
}

impl Role {
    /// Every valid role; used to gate routes open to any authenticated user.
    pub const ALL: &'static [Role] = &[Role::Admin, Role::User, Role::Viewer];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
            Role::Viewer => "viewer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "user" => Ok(Role::User),
            "viewer" => Ok(Role::Viewer),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// A role value outside the closed set.
#[derive(Debug, Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

/// An identity record.
#[derive(Debug, Clone, Serialize)]
pub struct Account {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    /// bcrypt hash; never plaintext
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub first_name: String,
    pub last_name: String,
    /// Retrieval URL of the current avatar object, if any
    pub avatar: Option<String>,
    pub active: bool,
    #[serde(skip_serializing)]
    pub reset_token: Option<String>,
    #[serde(skip_serializing)]
    pub reset_token_expiry: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when creating an account; the store assigns id and
/// timestamps.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub first_name: String,
    pub last_name: String,
}

impl Account {
    /// Build a fresh record from registration fields.
    pub fn create(new: NewAccount) -> Self {
        let now = Utc::now();
        Account {
            id: Uuid::new_v4(),
            username: new.username,
            email: new.email,
            password_hash: new.password_hash,
            role: new.role,
            first_name: new.first_name,
            last_name: new.last_name,
            avatar: None,
            active: false,
            reset_token: None,
            reset_token_expiry: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Errors from the account store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Unique constraint violation on the named field
    #[error("{field} already exists")]
    Duplicate { field: &'static str },

    /// The targeted record does not exist
    #[error("record not found")]
    NotFound,

    /// The backing store failed or is unreachable
    #[error("store backend error: {0}")]
    Backend(String),
}

/// Keyed account storage.
///
/// The store offers find-by-field lookups and atomic whole-document replace;
/// no multi-document transactions are assumed. Implementations must be safe
/// for concurrent access.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new account, enforcing username/email uniqueness.
    async fn insert(&self, new: NewAccount) -> Result<Account, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError>;

    /// Lookup by either field: inputs containing `@` are treated as an
    /// email address, anything else as a username.
    async fn find_by_username_or_email(
        &self,
        identifier: &str,
    ) -> Result<Option<Account>, StoreError> {
        if identifier.contains('@') {
            self.find_by_email(identifier).await
        } else {
            self.find_by_username(identifier).await
        }
    }

    /// Find the account holding `token` with an expiry still in the future.
    /// Token equality and expiry are one predicate so callers cannot tell a
    /// wrong token from an expired one.
    async fn find_by_valid_reset_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Account>, StoreError>;

    /// Whole-document replace keyed by `account.id`. Bumps `updated_at`.
    async fn update(&self, account: &Account) -> Result<(), StoreError>;

    /// Delete by id; returns whether a record existed.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        for role in Role::ALL {
            assert_eq!(Role::from_str(role.as_str()).unwrap(), *role);
        }
    }

    #[test]
    fn test_unknown_role_rejected() {
        assert!(Role::from_str("superadmin").is_err());
        assert!(Role::from_str("Admin").is_err());
        assert!(Role::from_str("").is_err());
    }

    #[test]
    fn test_account_serialization_omits_secrets() {
        let mut account = Account::create(NewAccount {
            username: "alice".to_string(),
            email: "a@x.com".to_string(),
            password_hash: "$2b$12$hash".to_string(),
            role: Role::User,
            first_name: "Alice".to_string(),
            last_name: "Smith".to_string(),
        });
        account.reset_token = Some("secret-token".to_string());

        let json = serde_json::to_string(&account).unwrap();
        assert!(!json.contains("$2b$12$hash"));
        assert!(!json.contains("secret-token"));
        assert!(json.contains("alice"));
    }
}
