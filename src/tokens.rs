//! Token Issuer
//!
//! HS256 JWT refresh/access pairs. Refresh tokens are revoked by putting
//! their `jti` into the [`TokenBlacklist`]; the blacklist is consulted on
//! every refresh and logout.

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::models::{Account, TokenClaims, TokenPair, TokenType};
use crate::store::TokenBlacklist;

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use std::sync::Arc;
use uuid::Uuid;

pub struct TokenIssuer {
    config: AuthConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    blacklist: Arc<dyn TokenBlacklist>,
}

impl TokenIssuer {
    pub fn new(config: AuthConfig, blacklist: Arc<dyn TokenBlacklist>) -> Self {
        let encoding_key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
            blacklist,
        }
    }

    // ============================================
    // Issuance
    // ============================================

    /// Issue a refresh token and an access token derived from it
    pub fn issue(&self, account: &Account) -> Result<TokenPair, AuthError> {
        let refresh_claims = self.claims(
            TokenType::Refresh,
            account.id,
            self.config.refresh_token_expiration,
        );
        let refresh = encode(&Header::default(), &refresh_claims, &self.encoding_key)?;
        let access = self.access_token_for(&refresh_claims)?;

        tracing::debug!(
            account_id = %account.id,
            jti = %refresh_claims.jti,
            "Issued token pair"
        );

        Ok(TokenPair { refresh, access })
    }

    /// Issue a new access token from a refresh token still in good standing
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, AuthError> {
        let claims = self.verify_refresh(refresh_token).await?;
        self.access_token_for(&claims)
    }

    fn access_token_for(&self, refresh: &TokenClaims) -> Result<String, AuthError> {
        let claims = self.claims(
            TokenType::Access,
            refresh.sub,
            self.config.access_token_expiration,
        );
        Ok(encode(&Header::default(), &claims, &self.encoding_key)?)
    }

    fn claims(&self, token_type: TokenType, sub: Uuid, lifetime: i64) -> TokenClaims {
        let now = Utc::now();
        let exp = now + Duration::seconds(lifetime);

        TokenClaims {
            token_type,
            sub,
            jti: Uuid::new_v4(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            iss: self.config.jwt_issuer.clone(),
            aud: self.config.jwt_audience.clone(),
        }
    }

    // ============================================
    // Verification
    // ============================================

    /// Decode a token and check signature, expiry, issuer, audience and kind
    fn decode(&self, token: &str, expected: TokenType) -> Result<TokenClaims, AuthError> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.config.jwt_issuer]);
        validation.set_audience(&[&self.config.jwt_audience]);
        validation.leeway = 0;

        let claims = decode::<TokenClaims>(token, &self.decoding_key, &validation)?.claims;

        if claims.token_type != expected {
            tracing::debug!(
                expected = ?expected,
                actual = ?claims.token_type,
                "Token has wrong type"
            );
            return Err(AuthError::InvalidToken);
        }

        Ok(claims)
    }

    /// Validate a bearer access token
    pub fn verify_access(&self, token: &str) -> Result<TokenClaims, AuthError> {
        self.decode(token, TokenType::Access)
    }

    /// Validate a refresh token, including the blacklist
    pub async fn verify_refresh(&self, token: &str) -> Result<TokenClaims, AuthError> {
        let claims = self.decode(token, TokenType::Refresh)?;

        if self.blacklist.contains(claims.jti).await? {
            return Err(AuthError::TokenBlacklisted);
        }

        Ok(claims)
    }

    // ============================================
    // Revocation
    // ============================================

    /// Blacklist a refresh token so it can no longer be used
    pub async fn revoke(&self, refresh_token: &str) -> Result<(), AuthError> {
        let claims = self.verify_refresh(refresh_token).await?;
        let expires_at = timestamp(claims.exp)?;

        // A concurrent revoke of the same token may win between the check
        // above and this insert; the store reports it and we fail the same way.
        if !self
            .blacklist
            .insert(claims.jti, claims.sub, expires_at)
            .await?
        {
            return Err(AuthError::TokenBlacklisted);
        }

        tracing::info!(account_id = %claims.sub, jti = %claims.jti, "Refresh token blacklisted");
        Ok(())
    }

    /// Drop blacklist entries for tokens that have expired anyway
    pub async fn purge_expired(&self) -> Result<u64, AuthError> {
        let purged = self.blacklist.purge_expired(Utc::now()).await?;
        if purged > 0 {
            tracing::info!(purged, "Purged expired blacklist entries");
        }
        Ok(purged)
    }
}

fn timestamp(secs: i64) -> Result<DateTime<Utc>, AuthError> {
    Utc.timestamp_opt(secs, 0)
        .single()
        .ok_or(AuthError::InvalidToken)
}
