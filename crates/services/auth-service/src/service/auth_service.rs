//! Authentication service - registration, sign-in, sign-out and refresh.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use common::{AppError, AppResult, OptionExt};
use domain::{normalize_email, CreateUser, NewUser, Password, SecretHasher, User, UserRole};

use super::refresh_store::RefreshTokenStore;
use super::token_issuer::{TokenIssuer, TokenKind, TokenPair};
use crate::client::UserDirectory;

/// Verified against when the email is unknown, so a miss costs as much as a
/// wrong password.
const DUMMY_PASSWORD: &str = "dummy-password-never-matches";

/// Authentication service trait for dependency injection.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a new USER identity
    async fn register(&self, input: CreateUser) -> AppResult<User>;

    /// Check credentials and issue a token pair
    async fn sign_in(&self, email: &str, password: &str) -> AppResult<TokenPair>;

    /// Drop the stored refresh token
    async fn sign_out(&self, user_id: i32) -> AppResult<()>;

    /// Exchange the current refresh token for a new pair
    async fn refresh(&self, user_id: i32, refresh_token: &str) -> AppResult<TokenPair>;
}

/// Concrete implementation of AuthService.
pub struct Authenticator {
    users: Arc<dyn UserDirectory>,
    issuer: Arc<TokenIssuer>,
    refresh_tokens: Arc<dyn RefreshTokenStore>,
    hasher: SecretHasher,
    dummy_hash: String,
}

impl Authenticator {
    /// Create new auth service instance. Hashes the timing dummy once.
    pub fn new(
        users: Arc<dyn UserDirectory>,
        issuer: Arc<TokenIssuer>,
        refresh_tokens: Arc<dyn RefreshTokenStore>,
        hasher: SecretHasher,
    ) -> AppResult<Self> {
        let dummy_hash = hasher.hash(DUMMY_PASSWORD)?;
        Ok(Self {
            users,
            issuer,
            refresh_tokens,
            hasher,
            dummy_hash,
        })
    }

    async fn verify_password(&self, plain: &str, stored_hash: String) -> AppResult<bool> {
        let hasher = self.hasher.clone();
        let plain = plain.to_string();
        tokio::task::spawn_blocking(move || Password::from_hash(stored_hash).verify(&plain, &hasher))
            .await
            .map_err(|e| AppError::internal(format!("Verification task failed: {}", e)))
    }

    async fn issue_and_store(&self, user: &User) -> AppResult<TokenPair> {
        let pair = self.issuer.issue(user).await?;
        self.refresh_tokens.save(user.id, &pair.refresh_token).await?;
        Ok(pair)
    }
}

#[async_trait]
impl AuthService for Authenticator {
    async fn register(&self, input: CreateUser) -> AppResult<User> {
        let email = normalize_email(&input.email);
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AppError::conflict("Email"));
        }

        let hasher = self.hasher.clone();
        let plain = input.password;
        let password = tokio::task::spawn_blocking(move || Password::new(&plain, &hasher))
            .await
            .map_err(|e| AppError::internal(format!("Hashing task failed: {}", e)))??;

        let user = self
            .users
            .create(NewUser {
                email,
                password: password.into_string(),
                full_name: input.full_name,
                address: input.address,
                phone_number: input.phone_number,
                role: UserRole::User,
            })
            .await?;

        info!(user_id = user.id, "User registered");
        Ok(user)
    }

    async fn sign_in(&self, email: &str, password: &str) -> AppResult<TokenPair> {
        let user = self.users.find_by_email(&normalize_email(email)).await?;

        let stored_hash = match &user {
            Some(user) => user.password_hash.clone(),
            None => self.dummy_hash.clone(),
        };
        let password_valid = self.verify_password(password, stored_hash).await?;

        let user = match user {
            Some(user) if password_valid => user,
            _ => {
                warn!("Sign-in rejected");
                return Err(AppError::InvalidCredentials);
            }
        };

        let pair = self.issue_and_store(&user).await?;
        info!(user_id = user.id, role = %user.role, "User signed in");
        Ok(pair)
    }

    async fn sign_out(&self, user_id: i32) -> AppResult<()> {
        self.refresh_tokens.clear(user_id).await?;
        info!(user_id, "User signed out");
        Ok(())
    }

    async fn refresh(&self, user_id: i32, refresh_token: &str) -> AppResult<TokenPair> {
        let claims = self
            .issuer
            .verify(refresh_token, TokenKind::Refresh)
            .map_err(|_| AppError::InvalidCredentials)?;
        if claims.sub != user_id {
            warn!(user_id, "Refresh token subject mismatch");
            return Err(AppError::InvalidCredentials);
        }

        let user = self.users.find_by_id(user_id).await?.ok_or_not_found()?;
        if !self.refresh_tokens.matches(user.id, refresh_token).await? {
            warn!(user_id, "Refresh token does not match stored hash");
            return Err(AppError::InvalidCredentials);
        }

        let pair = self.issue_and_store(&user).await?;
        info!(user_id, "Token pair refreshed");
        Ok(pair)
    }
}
