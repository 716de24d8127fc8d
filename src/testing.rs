//! Test helpers
//!
//! Cheap configuration and fixtures for unit and integration tests. The
//! Argon2 cost is lowered so hashing stays fast.

use crate::config::AuthConfig;
use crate::models::Account;
use crate::service::AuthService;
use crate::store::{MemoryAccountStore, MemoryTokenBlacklist};

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

/// Valid configuration with a fixed secret and minimal hashing cost
pub fn test_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: "test-secret-that-is-at-least-32-chars".to_string(),
        access_token_expiration: 300,
        refresh_token_expiration: 86400,
        jwt_issuer: "accounts-test".to_string(),
        jwt_audience: "accounts-test-api".to_string(),
        argon2_memory_cost: 8,
        argon2_time_cost: 1,
        argon2_parallelism: 1,
        min_password_length: 8,
    }
}

/// An active account that exists in no store
pub fn test_account() -> Account {
    Account {
        id: Uuid::new_v4(),
        username: "alice".to_string(),
        email: "a@x.com".to_string(),
        password_hash: String::new(),
        is_active: true,
        created_at: Utc::now(),
    }
}

/// Service over fresh in-memory stores
pub struct TestContext {
    pub service: Arc<AuthService>,
    pub accounts: Arc<MemoryAccountStore>,
    pub blacklist: Arc<MemoryTokenBlacklist>,
}

impl TestContext {
    pub fn new() -> Self {
        let accounts = Arc::new(MemoryAccountStore::new());
        let blacklist = Arc::new(MemoryTokenBlacklist::new());
        let service = AuthService::new(test_config(), accounts.clone(), blacklist.clone())
            .map(Arc::new)
            .unwrap_or_else(|e| panic!("test configuration rejected: {e}"));

        Self {
            service,
            accounts,
            blacklist,
        }
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
