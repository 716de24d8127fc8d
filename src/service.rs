//! Authentication Service
//!
//! Account creation and email/password authentication over an injected
//! [`AccountStore`], plus the [`TokenIssuer`] used by the handlers.

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::models::*;
use crate::password::PasswordHasher;
use crate::store::{AccountStore, TokenBlacklist};
use crate::tokens::TokenIssuer;

use std::sync::Arc;
use uuid::Uuid;

/// Authentication service
pub struct AuthService {
    accounts: Arc<dyn AccountStore>,
    tokens: TokenIssuer,
    hasher: PasswordHasher,
    config: AuthConfig,
}

impl AuthService {
    /// Create a new authentication service
    pub fn new(
        config: AuthConfig,
        accounts: Arc<dyn AccountStore>,
        blacklist: Arc<dyn TokenBlacklist>,
    ) -> Result<Self, AuthError> {
        config.validate()?;

        Ok(Self {
            accounts,
            tokens: TokenIssuer::new(config.clone(), blacklist),
            hasher: PasswordHasher::new(&config)?,
            config,
        })
    }

    /// Get reference to config
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Get the token issuer
    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    // ============================================
    // Registration
    // ============================================

    /// Create a new account.
    ///
    /// Email uniqueness is left to the store so two concurrent requests
    /// cannot both pass a pre-check.
    pub async fn register(&self, new_account: NewAccount) -> Result<Account, AuthError> {
        let password_hash = self.hasher.hash(&new_account.password)?;

        let account = self
            .accounts
            .insert(AccountRecord {
                username: new_account.username,
                email: new_account.email,
                password_hash,
            })
            .await?;

        tracing::info!(account_id = %account.id, "Account registered");
        Ok(account)
    }

    // ============================================
    // Login
    // ============================================

    /// Authenticate by email and password
    pub async fn login(&self, credentials: Credentials) -> Result<Account, AuthError> {
        let account = match self.accounts.find_by_email(&credentials.email).await? {
            Some(account) => account,
            None => {
                // Spend the same hashing time as a real check
                self.hasher.hash(&credentials.password)?;
                tracing::debug!("Login attempt for unknown email");
                return Err(AuthError::InvalidCredentials);
            }
        };

        if !self
            .hasher
            .verify(&credentials.password, &account.password_hash)?
        {
            tracing::debug!(account_id = %account.id, "Login failed: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        if !account.is_active {
            tracing::debug!(account_id = %account.id, "Login failed: account inactive");
            return Err(AuthError::InvalidCredentials);
        }

        tracing::info!(account_id = %account.id, "Account logged in");
        Ok(account)
    }

    // ============================================
    // Bearer Authentication
    // ============================================

    /// Resolve a bearer access token to an active account
    pub async fn authenticate_bearer(&self, token: &str) -> Result<Account, AuthError> {
        let claims = self
            .tokens
            .verify_access(token)
            .map_err(|_| AuthError::Unauthorized)?;

        match self.account(claims.sub).await? {
            Some(account) if account.is_active => Ok(account),
            _ => Err(AuthError::Unauthorized),
        }
    }

    /// Get account by ID
    pub async fn account(&self, id: Uuid) -> Result<Option<Account>, AuthError> {
        self.accounts.find_by_id(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryAccountStore, MemoryTokenBlacklist};
    use crate::testing::test_config;
    use tokio_test::{assert_err, assert_ok};

    fn service() -> (AuthService, Arc<MemoryAccountStore>) {
        let accounts = Arc::new(MemoryAccountStore::new());
        let service = AuthService::new(
            test_config(),
            accounts.clone(),
            Arc::new(MemoryTokenBlacklist::new()),
        )
        .unwrap();
        (service, accounts)
    }

    fn alice() -> NewAccount {
        NewAccount {
            username: "alice".into(),
            email: "a@x.com".into(),
            password: "password1".into(),
        }
    }

    fn creds(email: &str, password: &str) -> Credentials {
        Credentials {
            email: email.into(),
            password: password.into(),
        }
    }

    #[tokio::test]
    async fn test_register_hashes_password() {
        let (service, _) = service();
        let account = service.register(alice()).await.unwrap();

        assert_eq!(account.email, "a@x.com");
        assert_ne!(account.password_hash, "password1");
        assert!(account.is_active);
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let (service, accounts) = service();
        assert_ok!(service.register(alice()).await);

        let err = service.register(alice()).await.unwrap_err();
        assert!(matches!(err, AuthError::EmailExists));
        assert_eq!(accounts.len().await, 1);
    }

    #[tokio::test]
    async fn test_login_success() {
        let (service, _) = service();
        let registered = service.register(alice()).await.unwrap();

        let account = service.login(creds("a@x.com", "password1")).await.unwrap();
        assert_eq!(account.id, registered.id);
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let (service, _) = service();
        service.register(alice()).await.unwrap();

        let err = service.login(creds("a@x.com", "wrong")).await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid email or password");
    }

    #[tokio::test]
    async fn test_login_unknown_email() {
        let (service, _) = service();
        assert_err!(service.login(creds("nobody@x.com", "password1")).await);
    }

    #[tokio::test]
    async fn test_login_inactive_account() {
        let (service, accounts) = service();
        let account = service.register(alice()).await.unwrap();
        assert!(accounts.set_active(account.id, false).await);

        let err = service.login(creds("a@x.com", "password1")).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_authenticate_bearer() {
        let (service, accounts) = service();
        let account = service.register(alice()).await.unwrap();
        let pair = service.tokens().issue(&account).unwrap();

        let found = service.authenticate_bearer(&pair.access).await.unwrap();
        assert_eq!(found.id, account.id);

        assert!(matches!(
            service.authenticate_bearer(&pair.refresh).await,
            Err(AuthError::Unauthorized)
        ));

        accounts.set_active(account.id, false).await;
        assert!(matches!(
            service.authenticate_bearer(&pair.access).await,
            Err(AuthError::Unauthorized)
        ));
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = AuthConfig {
            jwt_secret: "short".into(),
            ..test_config()
        };

        let result = AuthService::new(
            config,
            Arc::new(MemoryAccountStore::new()),
            Arc::new(MemoryTokenBlacklist::new()),
        );
        assert!(result.is_err());
    }
}
