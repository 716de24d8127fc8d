//! Account HTTP Handlers
//!
//! REST API endpoints for registration, login, logout and token refresh.

use crate::error::AuthError;
use crate::extractors::{AuthAccount, Payload};
use crate::middleware;
use crate::models::*;
use crate::service::AuthService;

use axum::{
    extract::State,
    http::StatusCode,
    middleware as axum_middleware,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use std::sync::Arc;

/// Shared auth service state
pub type AuthState = Arc<AuthService>;

// ============================================
// Route Builder
// ============================================

/// Create account routes
pub fn create_routes(auth_service: AuthState) -> Router {
    // Public routes (no authentication required)
    let public = Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/token/refresh", post(refresh_token));

    // Protected routes (require a bearer access token)
    let protected = Router::new()
        .route("/logout", post(logout))
        .route_layer(axum_middleware::from_fn_with_state(
            auth_service.clone(),
            middleware::require_auth,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .with_state(auth_service)
}

// ============================================
// Registration
// ============================================

/// POST /register
///
/// Create an account and return it with a fresh token pair
pub async fn register(
    State(auth): State<AuthState>,
    Payload(req): Payload<RegisterRequest>,
) -> Result<impl IntoResponse, AuthError> {
    let new_account = req.into_new_account(auth.config().min_password_length)?;

    let account = auth.register(new_account).await?;
    let tokens = auth.tokens().issue(&account)?;

    Ok((StatusCode::CREATED, Json(AuthResponse::new(&account, tokens))))
}

// ============================================
// Login / Logout
// ============================================

/// POST /login
///
/// Authenticate by email and password and return a token pair
pub async fn login(
    State(auth): State<AuthState>,
    Payload(req): Payload<LoginRequest>,
) -> Result<impl IntoResponse, AuthError> {
    let credentials = req.into_credentials()?;

    let account = auth.login(credentials).await?;
    let tokens = auth.tokens().issue(&account)?;

    Ok(Json(AuthResponse::new(&account, tokens)))
}

/// POST /logout
///
/// Blacklist the supplied refresh token. Answers `205 Reset Content` on
/// success and an empty `400` for any client-side failure.
pub async fn logout(
    State(auth): State<AuthState>,
    AuthAccount(account): AuthAccount,
    body: Result<Payload<RefreshTokenRequest>, AuthError>,
) -> Response {
    let result = match body {
        Ok(Payload(RefreshTokenRequest {
            refresh: Some(refresh),
        })) => auth.tokens().revoke(&refresh).await,
        Ok(_) => Err(AuthError::Validation("refresh: This field is required.".into())),
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => {
            tracing::info!(account_id = %account.id, "Account logged out");
            StatusCode::RESET_CONTENT.into_response()
        }
        Err(e) if e.status().is_server_error() => e.into_response(),
        Err(e) => {
            tracing::debug!(account_id = %account.id, "Logout rejected: {}", e);
            StatusCode::BAD_REQUEST.into_response()
        }
    }
}

// ============================================
// Token Refresh
// ============================================

/// POST /token/refresh
///
/// Exchange a refresh token that is not blacklisted for a new access token
pub async fn refresh_token(
    State(auth): State<AuthState>,
    Payload(req): Payload<RefreshTokenRequest>,
) -> Result<impl IntoResponse, AuthError> {
    let refresh = req
        .refresh
        .ok_or_else(|| AuthError::Validation("refresh: This field is required.".into()))?;

    let access = auth.tokens().refresh(&refresh).await?;

    Ok(Json(AccessTokenResponse { access }))
}
