//! JWT authentication module.
//!
//! Handles credential checks, token issuance and token validation, plus the
//! [`AuthUser`] extractor that gates protected handlers.
//!
//! ```text
//! POST /token (username, password)
//!     │
//!     ▼
//! CredentialVerifier::verify ──✗──► 401 INVALID_CREDENTIALS
//!     │ ✓
//!     ▼
//! JwtManager::issue ──► {access_token, token_type: "bearer", expires_in}
//!
//! GET /orders/  Authorization: Bearer <token>
//!     │
//!     ▼
//! AuthUser extractor ── JwtManager::verify ──✗──► 401 INVALID_TOKEN
//!     │ ✓
//!     ▼
//! handler runs
//! ```

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::error::ApiError;
use crate::AppState;

// =============================================================================
// Errors
// =============================================================================

/// Authentication failures.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Incorrect username or password")]
    InvalidCredentials,

    /// Bad signature, malformed, expired; the cause is kept for logs only.
    #[error("Invalid or expired token: {0}")]
    InvalidOrExpiredToken(String),

    #[error("Failed to sign token: {0}")]
    Signing(String),

    #[error("Failed to hash password: {0}")]
    Hashing(String),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => ApiError::invalid_credentials(),
            AuthError::InvalidOrExpiredToken(_) => ApiError::invalid_token(),
            other => ApiError::internal(other),
        }
    }
}

// =============================================================================
// Claims & Tokens
// =============================================================================

/// JWT claims structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (username)
    pub sub: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    /// JWT ID (unique identifier for this token)
    pub jti: String,
}

/// Body of a successful `/token` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    /// Always `bearer`.
    pub token_type: String,
    /// Lifetime in seconds.
    pub expires_in: i64,
}

/// JWT token manager (HS256, fixed lifetime, zero leeway).
#[derive(Clone)]
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_lifetime_secs: i64,
}

impl JwtManager {
    /// Create a new JWT manager.
    pub fn new(secret: &str, access_lifetime_secs: i64) -> Self {
        JwtManager {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_lifetime_secs,
        }
    }

    /// Token lifetime in seconds.
    pub fn access_lifetime_secs(&self) -> i64 {
        self.access_lifetime_secs
    }

    /// Generate an access token for `subject`.
    pub fn issue(&self, subject: &str) -> Result<AccessToken, AuthError> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.access_lifetime_secs);

        let claims = Claims {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let access_token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Signing(e.to_string()))?;

        Ok(AccessToken {
            access_token,
            token_type: "bearer".to_string(),
            expires_in: self.access_lifetime_secs,
        })
    }

    /// Validate and decode a token.
    ///
    /// Expiry is checked with no leeway: a token is rejected once its `exp`
    /// has passed.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| AuthError::InvalidOrExpiredToken(e.to_string()))
    }
}

impl std::fmt::Debug for JwtManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtManager")
            .field("access_lifetime_secs", &self.access_lifetime_secs)
            .finish_non_exhaustive()
    }
}

/// Extract bearer token from authorization header.
///
/// The scheme is matched case-insensitively; an empty token is rejected.
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    let (scheme, token) = auth_header.split_once(' ')?;
    let token = token.trim();

    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}

// =============================================================================
// Credentials
// =============================================================================

/// Checks a username/password pair.
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, username: &str, password: &str) -> bool;
}

/// A single configured account. Only an Argon2 hash of the password is kept.
pub struct StaticCredentials {
    username: String,
    password_hash: String,
}

impl StaticCredentials {
    /// Hashes `password` with a fresh random salt.
    pub fn new(username: impl Into<String>, password: &str) -> Result<Self, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::Hashing(e.to_string()))?
            .to_string();

        Ok(StaticCredentials {
            username: username.into(),
            password_hash,
        })
    }
}

impl CredentialVerifier for StaticCredentials {
    /// The hash is checked for every attempt, so an unknown username costs
    /// the same as a wrong password.
    fn verify(&self, username: &str, password: &str) -> bool {
        let user_ok = username == self.username;

        let password_ok = PasswordHash::new(&self.password_hash)
            .map(|parsed_hash| {
                Argon2::default()
                    .verify_password(password.as_bytes(), &parsed_hash)
                    .is_ok()
            })
            .unwrap_or(false);

        user_ok & password_ok
    }
}

impl std::fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Extractor
// =============================================================================

/// The authenticated caller of a protected handler.
///
/// Taking `AuthUser` as a handler argument is what makes the route protected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub username: String,
    pub claims: Claims,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        let token = match header.and_then(extract_bearer_token) {
            Some(token) => token,
            None => {
                warn!(uri = %parts.uri, "Missing or malformed Authorization header");
                return Err(ApiError::invalid_token());
            }
        };

        match state.auth.verify_token(token) {
            Ok(claims) => Ok(AuthUser {
                username: claims.sub.clone(),
                claims,
            }),
            Err(e) => {
                warn!(uri = %parts.uri, error = %e, "Token rejected");
                Err(e.into())
            }
        }
    }
}
