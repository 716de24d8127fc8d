//! Service Configuration
//!
//! All configuration values are loaded from environment variables.
//! No hardcoded secrets or sensitive data.

use crate::error::AuthError;
use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

/// Authentication configuration loaded from environment
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// JWT secret key for signing tokens (from JWT_SECRET env var)
    pub jwt_secret: String,

    /// Access token lifetime in seconds (from JWT_ACCESS_EXPIRATION env var)
    pub access_token_expiration: i64,

    /// Refresh token lifetime in seconds (from JWT_REFRESH_EXPIRATION env var)
    pub refresh_token_expiration: i64,

    /// JWT issuer (from JWT_ISSUER env var)
    pub jwt_issuer: String,

    /// JWT audience (from JWT_AUDIENCE env var)
    pub jwt_audience: String,

    /// Argon2 memory cost in KiB (from ARGON2_MEMORY_COST env var)
    pub argon2_memory_cost: u32,

    /// Argon2 time cost (iterations) (from ARGON2_TIME_COST env var)
    pub argon2_time_cost: u32,

    /// Argon2 parallelism (from ARGON2_PARALLELISM env var)
    pub argon2_parallelism: u32,

    /// Minimum password length (from MIN_PASSWORD_LENGTH env var)
    pub min_password_length: usize,
}

impl AuthConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, AuthError> {
        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| AuthError::Config("JWT_SECRET environment variable must be set".into()))?;

        Ok(Self {
            jwt_secret,
            access_token_expiration: parse_or("JWT_ACCESS_EXPIRATION", 300)?, // 5 minutes
            refresh_token_expiration: parse_or("JWT_REFRESH_EXPIRATION", 86400)?, // 1 day
            jwt_issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "accounts".to_string()),
            jwt_audience: env::var("JWT_AUDIENCE")
                .unwrap_or_else(|_| "accounts-api".to_string()),
            argon2_memory_cost: parse_or("ARGON2_MEMORY_COST", argon2::Params::DEFAULT_M_COST)?,
            argon2_time_cost: parse_or("ARGON2_TIME_COST", argon2::Params::DEFAULT_T_COST)?,
            argon2_parallelism: parse_or("ARGON2_PARALLELISM", argon2::Params::DEFAULT_P_COST)?,
            min_password_length: parse_or("MIN_PASSWORD_LENGTH", 8)?,
        })
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.jwt_secret.len() < 32 {
            return Err(AuthError::Config(
                "JWT_SECRET must be at least 32 characters".to_string(),
            ));
        }

        if self.access_token_expiration <= 0 {
            return Err(AuthError::Config(
                "JWT_ACCESS_EXPIRATION must be positive".to_string(),
            ));
        }

        if self.refresh_token_expiration <= self.access_token_expiration {
            return Err(AuthError::Config(
                "JWT_REFRESH_EXPIRATION must be greater than JWT_ACCESS_EXPIRATION".to_string(),
            ));
        }

        if self.min_password_length < 8 {
            return Err(AuthError::Config(
                "MIN_PASSWORD_LENGTH must be at least 8".to_string(),
            ));
        }

        argon2::Params::new(
            self.argon2_memory_cost,
            self.argon2_time_cost,
            self.argon2_parallelism,
            None,
        )
        .map_err(|e| AuthError::Config(format!("Invalid Argon2 parameters: {e}")))?;

        Ok(())
    }
}

/// Process-level settings for the HTTP server binary
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// PostgreSQL connection string (from DATABASE_URL env var)
    pub database_url: String,

    /// Pool size (from DATABASE_MAX_CONNECTIONS env var)
    pub max_connections: u32,

    /// Listen address (from BIND_ADDR env var)
    pub bind_addr: SocketAddr,

    /// Browser origins allowed to call the API (from CORS_ALLOWED_ORIGINS env var)
    pub cors_allowed_origins: Vec<String>,

    /// How often expired blacklist entries are deleted (from BLACKLIST_PURGE_INTERVAL env var)
    pub blacklist_purge_interval: Duration,
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, AuthError> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| AuthError::Config("DATABASE_URL environment variable must be set".into()))?;

        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let purge_secs: u64 = parse_or("BLACKLIST_PURGE_INTERVAL", 3600)?;
        if purge_secs == 0 {
            return Err(AuthError::Config(
                "BLACKLIST_PURGE_INTERVAL must be positive".to_string(),
            ));
        }

        Ok(Self {
            database_url,
            max_connections: parse_or("DATABASE_MAX_CONNECTIONS", 10)?,
            bind_addr: parse_or("BIND_ADDR", SocketAddr::from(([127, 0, 0, 1], 8000)))?,
            cors_allowed_origins,
            blacklist_purge_interval: Duration::from_secs(purge_secs),
        })
    }
}

/// Read an optional variable, falling back to `default` when unset.
///
/// A value that is set but does not parse is a configuration error rather
/// than a silent fallback.
fn parse_or<T: FromStr>(key: &str, default: T) -> Result<T, AuthError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AuthError::Config(format!("{key} has an invalid value: {raw:?}"))),
        Err(_) => Ok(default),
    }
}
