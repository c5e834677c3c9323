//! Token issuer - signs and verifies access/refresh JWT pairs.

use std::sync::Arc;

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use common::AppError;
use domain::{User, UserRole, TOKEN_TYPE_BEARER};

use crate::config::{AuthServiceConfig, TokenSettings};

/// Which secret a token is signed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

/// JWT claims payload, a snapshot of the identity at issuance time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i32,
    pub email: String,
    pub role: UserRole,
    pub iat: i64,
    pub exp: i64,
    /// Unique per token, so two pairs minted in the same second differ
    pub jti: String,
}

impl Claims {
    fn for_user(user: &User, issued_at: i64, ttl_secs: i64) -> Self {
        Self {
            sub: user.id,
            email: user.email.clone(),
            role: user.role,
            iat: issued_at,
            exp: issued_at.saturating_add(ttl_secs),
            jti: Uuid::new_v4().to_string(),
        }
    }
}

/// Access and refresh token returned after sign-in or refresh.
#[derive(Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct TokenPair {
    /// Short-lived JWT for the `Authorization` header
    pub access_token: String,
    /// Long-lived JWT accepted only by the refresh endpoint
    pub refresh_token: String,
    /// Always "Bearer"
    pub token_type: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
}

impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .finish_non_exhaustive()
    }
}

/// Token failures. Expired, tampered and wrong-kind tokens are all `Invalid`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Invalid or expired token")]
    Invalid,

    #[error("Token signing failed: {0}")]
    Signing(String),
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Invalid => AppError::Unauthorized,
            TokenError::Signing(msg) => AppError::Internal(msg),
        }
    }
}

struct SigningKey {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: i64,
}

impl SigningKey {
    fn new(settings: &TokenSettings) -> Self {
        let secret = settings.secret.as_bytes();
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl_secs: i64::try_from(settings.ttl.as_secs()).unwrap_or(i64::MAX),
        }
    }

    fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }
}

/// Mints and verifies token pairs. Each kind has its own secret and lifetime.
pub struct TokenIssuer {
    access: Arc<SigningKey>,
    refresh: Arc<SigningKey>,
    validation: Validation,
}

impl TokenIssuer {
    pub fn new(config: &AuthServiceConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            access: Arc::new(SigningKey::new(&config.access)),
            refresh: Arc::new(SigningKey::new(&config.refresh)),
            validation,
        }
    }

    /// Access token lifetime in seconds.
    pub fn access_ttl_secs(&self) -> i64 {
        self.access.ttl_secs
    }

    /// Sign an access and a refresh token for `user`. Both or neither.
    pub async fn issue(&self, user: &User) -> Result<TokenPair, TokenError> {
        let now = Utc::now().timestamp();
        let access_claims = Claims::for_user(user, now, self.access.ttl_secs);
        let refresh_claims = Claims::for_user(user, now, self.refresh.ttl_secs);

        let (access_token, refresh_token) = tokio::try_join!(
            sign_blocking(self.access.clone(), access_claims),
            sign_blocking(self.refresh.clone(), refresh_claims),
        )?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            token_type: TOKEN_TYPE_BEARER.to_string(),
            expires_in: self.access_ttl_secs(),
        })
    }

    /// Check signature and expiry against the secret for `kind`.
    pub fn verify(&self, token: &str, kind: TokenKind) -> Result<Claims, TokenError> {
        let key = match kind {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        };

        decode::<Claims>(token, &key.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|_| TokenError::Invalid)
    }
}

async fn sign_blocking(key: Arc<SigningKey>, claims: Claims) -> Result<String, TokenError> {
    tokio::task::spawn_blocking(move || key.sign(&claims))
        .await
        .map_err(|e| TokenError::Signing(e.to_string()))?
}
