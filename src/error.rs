//! Authentication Error Types
//!
//! Centralized error handling for all account and token operations.
//! Every client-side failure is reported as `400 Bad Request`; only a
//! missing or rejected bearer credential gets `401`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

/// Authentication errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum AuthError {
    /// Malformed or inconsistent input
    #[error("{0}")]
    Validation(String),

    #[error("An account with this email already exists.")]
    EmailExists,

    /// Unknown email, wrong password or inactive account
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Malformed, badly signed, expired or wrong-kind token
    #[error("Token is invalid or expired")]
    InvalidToken,

    #[error("Token is blacklisted")]
    TokenBlacklisted,

    #[error("Authentication credentials were not provided or are invalid.")]
    Unauthorized,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error")]
    Internal,
}

impl AuthError {
    /// HTTP status this error maps to
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::Validation(_)
            | AuthError::EmailExists
            | AuthError::InvalidCredentials
            | AuthError::InvalidToken
            | AuthError::TokenBlacklisted => StatusCode::BAD_REQUEST,
            AuthError::Unauthorized => StatusCode::UNAUTHORIZED,
            AuthError::Database(_) | AuthError::Config(_) | AuthError::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// True for errors raised while checking a token
    pub fn is_token_error(&self) -> bool {
        matches!(self, AuthError::InvalidToken | AuthError::TokenBlacklisted)
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = if status.is_server_error() {
            "An internal error occurred".to_string()
        } else {
            self.to_string()
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl From<sqlx::Error> for AuthError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("Database error: {:?}", err);
        AuthError::Database(err.to_string())
    }
}

impl From<argon2::password_hash::Error> for AuthError {
    fn from(err: argon2::password_hash::Error) -> Self {
        tracing::error!("Password hashing error: {:?}", err);
        AuthError::Internal
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        tracing::debug!("JWT error: {:?}", err);
        AuthError::InvalidToken
    }
}
