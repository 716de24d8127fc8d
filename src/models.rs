//! Account Models
//!
//! Data structures for requests, responses, stored records and JWT claims.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

// ============================================
// Database Entities
// ============================================

/// Account entity from the store
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Account {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Account ready to be persisted; the password is already hashed
#[derive(Debug, Clone)]
pub struct AccountRecord {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// Revoked refresh token, keyed by its `jti`
#[derive(Debug, Clone, FromRow)]
pub struct BlacklistEntry {
    pub jti: Uuid,
    pub account_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub blacklisted_at: DateTime<Utc>,
}

// ============================================
// Request DTOs
// ============================================
//
// Every field is optional at the serde level so that a missing field
// surfaces as a validation error instead of a deserialization rejection.

/// Registration request
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct RegisterRequest {
    #[serde(default)]
    #[validate(length(max = 150, message = "Ensure this field has no more than 150 characters."))]
    pub username: Option<String>,

    #[serde(default)]
    #[validate(
        email(message = "Enter a valid email address."),
        length(max = 255, message = "Ensure this field has no more than 255 characters.")
    )]
    pub email: Option<String>,

    #[serde(default)]
    #[validate(length(max = 128, message = "Ensure this field has no more than 128 characters."))]
    pub password: Option<String>,

    #[serde(default)]
    pub password_confirm: Option<String>,
}

/// Login request
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(
        email(message = "Enter a valid email address."),
        length(max = 255, message = "Ensure this field has no more than 255 characters.")
    )]
    pub email: Option<String>,

    #[serde(default)]
    #[validate(length(max = 128, message = "Ensure this field has no more than 128 characters."))]
    pub password: Option<String>,
}

/// Body of logout and token refresh requests
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RefreshTokenRequest {
    #[serde(default)]
    pub refresh: Option<String>,
}

/// Validated registration input
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Validated login input; never persisted
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

// ============================================
// Response DTOs
// ============================================

/// Public account fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

impl From<&Account> for AccountResponse {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            username: account.username.clone(),
            email: account.email.clone(),
        }
    }
}

/// Refresh/access pair issued for one account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub refresh: String,
    pub access: String,
}

/// Register and login response: account fields plus tokens
#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    #[serde(flatten)]
    pub account: AccountResponse,
    #[serde(flatten)]
    pub tokens: TokenPair,
}

impl AuthResponse {
    pub fn new(account: &Account, tokens: TokenPair) -> Self {
        Self {
            account: AccountResponse::from(account),
            tokens,
        }
    }
}

/// Token refresh response
#[derive(Debug, Clone, Serialize)]
pub struct AccessTokenResponse {
    pub access: String,
}

// ============================================
// JWT Claims
// ============================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// JWT claims shared by access and refresh tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    pub token_type: TokenType,
    /// Subject (account ID)
    pub sub: Uuid,
    /// JWT ID, unique per token; the blacklist key
    pub jti: Uuid,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
    pub aud: String,
}
