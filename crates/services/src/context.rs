use std::sync::{Arc, PoisonError, RwLock};

use api::{ApiError, AuthApi, TokenStore};

use crate::error::AuthError;

/// Explicit authentication lifecycle for one app run.
///
/// The bearer token is installed on login and torn down on logout;
/// nothing else in the client reads or writes it. This replaces the
/// ambient module-level token storage the platform used to rely on.
pub struct SessionContext {
    auth: Arc<dyn AuthApi>,
    tokens: Arc<dyn TokenStore>,
    identity: RwLock<Option<String>>,
}

impl SessionContext {
    #[must_use]
    pub fn new(auth: Arc<dyn AuthApi>, tokens: Arc<dyn TokenStore>) -> Self {
        Self {
            auth,
            tokens,
            identity: RwLock::new(None),
        }
    }

    /// Authenticates and installs the bearer token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` when the backend rejects
    /// the pair, `AuthError::Api` for transport failures.
    pub async fn login(&self, username: &str, password: &str) -> Result<(), AuthError> {
        let token = match self.auth.login(username, password).await {
            Ok(token) => token,
            Err(ApiError::Unauthorized) => return Err(AuthError::InvalidCredentials),
            Err(err) => return Err(err.into()),
        };

        self.tokens.set_token(Some(token.bearer));
        // The identity is a plain Option; a poisoned guard is recovered
        // rather than propagated.
        *self.identity.write().unwrap_or_else(PoisonError::into_inner) = Some(token.display_name);
        tracing::info!(user = %username, "logged in");
        Ok(())
    }

    /// Tears the token down. The backend call is best effort; local
    /// state is cleared even when it fails.
    pub async fn logout(&self) {
        if let Err(err) = self.auth.logout().await {
            tracing::warn!(error = %err, "server-side logout failed, clearing local token anyway");
        }
        self.tokens.set_token(None);
        *self.identity.write().unwrap_or_else(PoisonError::into_inner) = None;
        tracing::info!("logged out");
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.tokens.token().is_some()
    }

    #[must_use]
    pub fn display_name(&self) -> Option<String> {
        self.identity
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
