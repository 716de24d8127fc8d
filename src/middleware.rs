//! Authentication Middleware
//!
//! Bearer access token validation for protected routes.

use crate::error::AuthError;
use crate::handlers::AuthState;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

/// Extract the token from an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let header = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AuthError::Unauthorized)?;

    match header.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() => {
            Ok(token.trim())
        }
        _ => Err(AuthError::Unauthorized),
    }
}

/// Require an authenticated, active account.
///
/// Stores the resolved [`Account`](crate::models::Account) in request
/// extensions for the [`AuthAccount`](crate::extractors::AuthAccount)
/// extractor.
pub async fn require_auth(
    State(auth): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = bearer_token(req.headers())?;
    let account = auth.authenticate_bearer(token).await.map_err(|e| {
        tracing::debug!("Bearer authentication failed: {}", e);
        e
    })?;

    req.extensions_mut().insert(account);

    Ok(next.run(req).await)
}
