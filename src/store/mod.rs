//! Persistence
//!
//! Account and token blacklist storage behind traits so the service can
//! run against PostgreSQL in production and an in-memory store in tests.

pub mod memory;
pub mod postgres;

pub use memory::{MemoryAccountStore, MemoryTokenBlacklist};
pub use postgres::{migrate, PgAccountStore, PgTokenBlacklist};

use crate::error::AuthError;
use crate::models::{Account, AccountRecord, BlacklistEntry};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Account storage
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Persist a new active account.
    ///
    /// Must fail with [`AuthError::EmailExists`] when the email is taken.
    /// The check and the insert are a single atomic step.
    async fn insert(&self, record: AccountRecord) -> Result<Account, AuthError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AuthError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, AuthError>;
}

/// Revoked refresh tokens, keyed by `jti`
#[async_trait]
pub trait TokenBlacklist: Send + Sync {
    /// Add a token. Returns `false` if it was already present.
    async fn insert(
        &self,
        jti: Uuid,
        account_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<bool, AuthError>;

    async fn contains(&self, jti: Uuid) -> Result<bool, AuthError>;

    async fn get(&self, jti: Uuid) -> Result<Option<BlacklistEntry>, AuthError>;

    /// Delete entries whose tokens expired before `now`; returns the count
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AuthError>;
}
