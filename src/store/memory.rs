//! In-memory stores, used by tests and local development.

use super::{AccountStore, TokenBlacklist};
use crate::error::AuthError;
use crate::models::{Account, AccountRecord, BlacklistEntry};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct MemoryAccountStore {
    accounts: RwLock<HashMap<Uuid, Account>>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip the active flag of an account; returns false if it does not exist
    pub async fn set_active(&self, id: Uuid, is_active: bool) -> bool {
        match self.accounts.write().await.get_mut(&id) {
            Some(account) => {
                account.is_active = is_active;
                true
            }
            None => false,
        }
    }

    pub async fn len(&self) -> usize {
        self.accounts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn insert(&self, record: AccountRecord) -> Result<Account, AuthError> {
        // Uniqueness check and insert under one write lock
        let mut accounts = self.accounts.write().await;

        if accounts.values().any(|a| a.email == record.email) {
            return Err(AuthError::EmailExists);
        }

        let account = Account {
            id: Uuid::new_v4(),
            username: record.username,
            email: record.email,
            password_hash: record.password_hash,
            is_active: true,
            created_at: Utc::now(),
        };
        accounts.insert(account.id, account.clone());

        Ok(account)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AuthError> {
        Ok(self
            .accounts
            .read()
            .await
            .values()
            .find(|a| a.email == email)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, AuthError> {
        Ok(self.accounts.read().await.get(&id).cloned())
    }
}

#[derive(Debug, Default)]
pub struct MemoryTokenBlacklist {
    entries: RwLock<HashMap<Uuid, BlacklistEntry>>,
}

impl MemoryTokenBlacklist {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl TokenBlacklist for MemoryTokenBlacklist {
    async fn insert(
        &self,
        jti: Uuid,
        account_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<bool, AuthError> {
        let mut entries = self.entries.write().await;

        if entries.contains_key(&jti) {
            return Ok(false);
        }

        entries.insert(
            jti,
            BlacklistEntry {
                jti,
                account_id,
                expires_at,
                blacklisted_at: Utc::now(),
            },
        );
        Ok(true)
    }

    async fn contains(&self, jti: Uuid) -> Result<bool, AuthError> {
        Ok(self.entries.read().await.contains_key(&jti))
    }

    async fn get(&self, jti: Uuid) -> Result<Option<BlacklistEntry>, AuthError> {
        Ok(self.entries.read().await.get(&jti).cloned())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AuthError> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at >= now);
        Ok((before - entries.len()) as u64)
    }
}
