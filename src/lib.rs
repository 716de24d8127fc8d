//! Accounts Service
//!
//! Account registration, login and logout over a JSON HTTP API:
//! - Registration with password confirmation and length rules
//! - Email/password login against Argon2id hashes
//! - JWT refresh/access token pairs
//! - Refresh token revocation through a persisted blacklist
//! - Access token refresh that honours the blacklist
//!
//! # Configuration
//!
//! Authentication settings are loaded from environment variables:
//! - `JWT_SECRET` - Secret key for signing JWTs (required, min 32 chars)
//! - `JWT_ACCESS_EXPIRATION` - Access token expiration in seconds (default: 300)
//! - `JWT_REFRESH_EXPIRATION` - Refresh token expiration in seconds (default: 86400)
//! - `JWT_ISSUER` - JWT issuer claim (default: "accounts")
//! - `JWT_AUDIENCE` - JWT audience claim (default: "accounts-api")
//! - `MIN_PASSWORD_LENGTH` - Minimum password length (default: 8)
//!
//! The server binary additionally reads `DATABASE_URL` (required),
//! `BIND_ADDR`, `CORS_ALLOWED_ORIGINS` and `BLACKLIST_PURGE_INTERVAL`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use accounts_service::{create_routes, AuthConfig, AuthService};
//! use accounts_service::store::{migrate, PgAccountStore, PgTokenBlacklist};
//!
//! migrate(&pool).await?;
//! let auth = AuthService::new(
//!     AuthConfig::from_env()?,
//!     Arc::new(PgAccountStore::new(pool.clone())),
//!     Arc::new(PgTokenBlacklist::new(pool)),
//! )?;
//! let app = Router::new().nest("/api", create_routes(Arc::new(auth)));
//! ```

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod password;
pub mod service;
pub mod store;
pub mod testing;
pub mod tokens;
pub mod validation;

// Re-export commonly used types
pub use config::{AuthConfig, ServerConfig};
pub use error::AuthError;
pub use extractors::{AuthAccount, Payload};
pub use handlers::{create_routes, AuthState};
pub use models::*;
pub use service::AuthService;
pub use tokens::TokenIssuer;
