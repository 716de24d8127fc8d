//! Request Extractors
//!
//! Axum extractors for the authenticated caller and JSON request bodies.

use crate::error::AuthError;
use crate::handlers::AuthState;
use crate::middleware::bearer_token;
use crate::models::Account;

use axum::{
    async_trait,
    extract::{FromRef, FromRequest, FromRequestParts, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;

/// Account authenticated by a bearer access token
#[derive(Debug, Clone)]
pub struct AuthAccount(pub Account);

#[async_trait]
impl<S> FromRequestParts<S> for AuthAccount
where
    AuthState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // Already resolved by the require_auth middleware
        if let Some(account) = parts.extensions.get::<Account>() {
            return Ok(AuthAccount(account.clone()));
        }

        let token = bearer_token(&parts.headers)?;
        let auth = AuthState::from_ref(state);
        let account = auth.authenticate_bearer(token).await?;

        Ok(AuthAccount(account))
    }
}

/// JSON body whose rejections are reported as validation errors (400)
/// instead of axum's default 415/422 responses
#[derive(Debug, Clone)]
pub struct Payload<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for Payload<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AuthError::Validation(rejection.body_text()))?;

        Ok(Payload(value))
    }
}
