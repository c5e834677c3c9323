//! User service - identity lookups and user management.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use common::{AppError, AppResult};
use domain::{normalize_email, NewUser, SecretHasher, UpdateUser, User};

use crate::repository::UserRepository;

/// User service trait for dependency injection.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Get user by ID, `NotFound` if absent
    async fn get_user(&self, id: i32) -> AppResult<User>;

    /// Look up a user by ID
    async fn find_user(&self, id: i32) -> AppResult<Option<User>>;

    /// Look up a user by email (normalized before the query)
    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// List all users
    async fn list_users(&self) -> AppResult<Vec<User>>;

    /// Create a new user. The password is hashed unless it already is.
    async fn create_user(&self, new_user: NewUser) -> AppResult<User>;

    /// Update profile fields and, on privileged paths, the role
    async fn update_user(&self, id: i32, changes: UpdateUser) -> AppResult<User>;

    /// Overwrite or clear the stored refresh token hash
    async fn set_refresh_token_hash(&self, id: i32, hash: Option<String>) -> AppResult<()>;

    /// Delete user
    async fn delete_user(&self, id: i32) -> AppResult<()>;
}

/// Concrete implementation of UserService using repository.
pub struct UserManager {
    repo: Arc<dyn UserRepository>,
    hasher: SecretHasher,
}

impl UserManager {
    /// Create new user service instance with repository
    pub fn new(repo: Arc<dyn UserRepository>, hasher: SecretHasher) -> Self {
        Self { repo, hasher }
    }

    async fn ensure_unique(&self, email: &str, phone_number: &str) -> AppResult<()> {
        if self.repo.find_by_email(email).await?.is_some() {
            return Err(AppError::conflict("Email"));
        }
        if self.repo.find_by_phone_number(phone_number).await?.is_some() {
            return Err(AppError::conflict("Phone number"));
        }
        Ok(())
    }
}

#[async_trait]
impl UserService for UserManager {
    async fn get_user(&self, id: i32) -> AppResult<User> {
        self.repo.find_by_id(id).await?.ok_or(AppError::NotFound)
    }

    async fn find_user(&self, id: i32) -> AppResult<Option<User>> {
        self.repo.find_by_id(id).await
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        self.repo.find_by_email(&normalize_email(email)).await
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        self.repo.list().await
    }

    async fn create_user(&self, new_user: NewUser) -> AppResult<User> {
        let mut new_user = new_user.normalized();
        self.ensure_unique(&new_user.email, &new_user.phone_number)
            .await?;

        let hasher = self.hasher.clone();
        let password = std::mem::take(&mut new_user.password);
        new_user.password =
            tokio::task::spawn_blocking(move || hasher.hash_if_plain(&password))
                .await
                .map_err(|e| AppError::internal(format!("Hashing task failed: {}", e)))??;

        let user = self.repo.create(new_user).await?;
        info!(user_id = user.id, role = %user.role, "User created");
        Ok(user)
    }

    async fn update_user(&self, id: i32, changes: UpdateUser) -> AppResult<User> {
        let changes = changes.normalized();
        if changes.is_empty() {
            return self.get_user(id).await;
        }

        if let Some(ref phone_number) = changes.phone_number {
            if let Some(existing) = self.repo.find_by_phone_number(phone_number).await? {
                if existing.id != id {
                    return Err(AppError::conflict("Phone number"));
                }
            }
        }

        let user = self.repo.update(id, changes).await?;
        debug!(user_id = user.id, "User updated");
        Ok(user)
    }

    async fn set_refresh_token_hash(&self, id: i32, hash: Option<String>) -> AppResult<()> {
        self.repo.set_refresh_token_hash(id, hash).await
    }

    async fn delete_user(&self, id: i32) -> AppResult<()> {
        self.repo.delete(id).await?;
        info!(user_id = id, "User deleted");
        Ok(())
    }
}
