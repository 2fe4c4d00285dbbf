//! Token issuance and verification.

use std::sync::Arc;

use tracing::{info, warn};

use crate::auth::{AccessToken, AuthError, Claims, CredentialVerifier, JwtManager, StaticCredentials};
use crate::config::ApiConfig;

/// Exchanges a username/password pair for a bearer token.
#[derive(Clone)]
pub struct AuthService {
    jwt: JwtManager,
    credentials: Arc<dyn CredentialVerifier>,
}

impl AuthService {
    pub fn new(jwt: JwtManager, credentials: Arc<dyn CredentialVerifier>) -> Self {
        AuthService { jwt, credentials }
    }

    /// Builds the service for the single account named in `config`.
    pub fn from_config(config: &ApiConfig) -> Result<Self, AuthError> {
        let credentials = StaticCredentials::new(&config.auth_username, &config.auth_password)?;
        let jwt = JwtManager::new(&config.jwt_secret, config.jwt_access_lifetime_secs);
        Ok(AuthService::new(jwt, Arc::new(credentials)))
    }

    /// Issues a token if the credentials match.
    pub fn issue_token(&self, username: &str, password: &str) -> Result<AccessToken, AuthError> {
        if !self.credentials.verify(username, password) {
            warn!(%username, "Rejected token request");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.jwt.issue(username)?;
        info!(%username, expires_in = token.expires_in, "Token issued");
        Ok(token)
    }

    /// Validates a bearer token.
    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        self.jwt.verify(token)
    }
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("jwt", &self.jwt)
            .finish_non_exhaustive()
    }
}
