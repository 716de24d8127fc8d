//! PostgreSQL stores backed by sqlx.

use super::{AccountStore, TokenBlacklist};
use crate::error::AuthError;
use crate::models::{Account, AccountRecord, BlacklistEntry};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Create the schema if it does not exist yet
pub async fn migrate(db: &PgPool) -> Result<(), AuthError> {
    tracing::info!("Running account database migrations");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS accounts (
            id UUID PRIMARY KEY,
            username VARCHAR(150) NOT NULL,
            email VARCHAR(255) NOT NULL,
            password_hash VARCHAR(255) NOT NULL,
            is_active BOOLEAN NOT NULL DEFAULT TRUE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            CONSTRAINT accounts_email_key UNIQUE (email)
        );
        "#,
    )
    .execute(db)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS token_blacklist (
            jti UUID PRIMARY KEY,
            account_id UUID NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
            expires_at TIMESTAMPTZ NOT NULL,
            blacklisted_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(db)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_token_blacklist_expires ON token_blacklist(expires_at);",
    )
    .execute(db)
    .await?;

    tracing::info!("Account migrations completed successfully");
    Ok(())
}

#[derive(Debug, Clone)]
pub struct PgAccountStore {
    db: PgPool,
}

impl PgAccountStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn insert(&self, record: AccountRecord) -> Result<Account, AuthError> {
        // The UNIQUE constraint decides concurrent registrations
        let result = sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts (id, username, email, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, email, password_hash, is_active, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&record.username)
        .bind(&record.email)
        .bind(&record.password_hash)
        .fetch_one(&self.db)
        .await;

        match result {
            Ok(account) => Ok(account),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(AuthError::EmailExists)
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AuthError> {
        let account = sqlx::query_as(
            "SELECT id, username, email, password_hash, is_active, created_at FROM accounts WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(account)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, AuthError> {
        let account = sqlx::query_as(
            "SELECT id, username, email, password_hash, is_active, created_at FROM accounts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(account)
    }
}

#[derive(Debug, Clone)]
pub struct PgTokenBlacklist {
    db: PgPool,
}

impl PgTokenBlacklist {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TokenBlacklist for PgTokenBlacklist {
    async fn insert(
        &self,
        jti: Uuid,
        account_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<bool, AuthError> {
        let result = sqlx::query(
            r#"
            INSERT INTO token_blacklist (jti, account_id, expires_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (jti) DO NOTHING
            "#,
        )
        .bind(jti)
        .bind(account_id)
        .bind(expires_at)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn contains(&self, jti: Uuid) -> Result<bool, AuthError> {
        let found: Option<(Uuid,)> = sqlx::query_as("SELECT jti FROM token_blacklist WHERE jti = $1")
            .bind(jti)
            .fetch_optional(&self.db)
            .await?;
        Ok(found.is_some())
    }

    async fn get(&self, jti: Uuid) -> Result<Option<BlacklistEntry>, AuthError> {
        let entry = sqlx::query_as(
            "SELECT jti, account_id, expires_at, blacklisted_at FROM token_blacklist WHERE jti = $1",
        )
        .bind(jti)
        .fetch_optional(&self.db)
        .await?;
        Ok(entry)
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AuthError> {
        let result = sqlx::query("DELETE FROM token_blacklist WHERE expires_at < $1")
            .bind(now)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected())
    }
}
