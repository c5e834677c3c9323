//! Refresh token store - one hashed refresh token per user.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use common::{AppError, AppResult, OptionExt};
use domain::SecretHasher;

use crate::client::UserDirectory;

/// Persistence of the current refresh token, in hashed form only.
#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    /// Hash `raw_token` and overwrite whatever was stored before.
    async fn save(&self, user_id: i32, raw_token: &str) -> AppResult<()>;

    /// Forget the stored token. Clearing twice is fine.
    async fn clear(&self, user_id: i32) -> AppResult<()>;

    /// Whether `raw_token` is the one last saved. `false` when nothing is
    /// stored; `NotFound` when the user is gone.
    async fn matches(&self, user_id: i32, raw_token: &str) -> AppResult<bool>;
}

/// Stores the Argon2 hash of the refresh token on the user row.
pub struct HashedRefreshTokenStore {
    users: Arc<dyn UserDirectory>,
    hasher: SecretHasher,
}

impl HashedRefreshTokenStore {
    pub fn new(users: Arc<dyn UserDirectory>, hasher: SecretHasher) -> Self {
        Self { users, hasher }
    }
}

#[async_trait]
impl RefreshTokenStore for HashedRefreshTokenStore {
    async fn save(&self, user_id: i32, raw_token: &str) -> AppResult<()> {
        let hasher = self.hasher.clone();
        let raw = raw_token.to_string();
        let hash = tokio::task::spawn_blocking(move || hasher.hash(&raw))
            .await
            .map_err(|e| AppError::internal(format!("Hashing task failed: {}", e)))??;

        self.users.set_refresh_token_hash(user_id, Some(hash)).await?;
        debug!(user_id, "Refresh token stored");
        Ok(())
    }

    async fn clear(&self, user_id: i32) -> AppResult<()> {
        self.users.set_refresh_token_hash(user_id, None).await?;
        debug!(user_id, "Refresh token cleared");
        Ok(())
    }

    async fn matches(&self, user_id: i32, raw_token: &str) -> AppResult<bool> {
        let user = self.users.find_by_id(user_id).await?.ok_or_not_found()?;
        let Some(stored) = user.refresh_token_hash else {
            return Ok(false);
        };

        let hasher = self.hasher.clone();
        let raw = raw_token.to_string();
        tokio::task::spawn_blocking(move || hasher.verify(&raw, &stored))
            .await
            .map_err(|e| AppError::internal(format!("Verification task failed: {}", e)))
    }
}
