//! User directory client for auth-service.

use std::sync::Arc;

use async_trait::async_trait;

use common::AppResult;
use domain::{NewUser, User};
use user_service_lib::UserService;

/// User operations needed by auth-service.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, id: i32) -> AppResult<Option<User>>;

    /// Find user by email (normalized by the callee)
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Create a new user
    async fn create(&self, new_user: NewUser) -> AppResult<User>;

    /// Overwrite or clear the stored refresh token hash
    async fn set_refresh_token_hash(&self, id: i32, hash: Option<String>) -> AppResult<()>;
}

/// In-process client that calls the user service directly.
pub struct EmbeddedUserClient {
    users: Arc<dyn UserService>,
}

impl EmbeddedUserClient {
    pub fn new(users: Arc<dyn UserService>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl UserDirectory for EmbeddedUserClient {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<User>> {
        self.users.find_user(id).await
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        self.users.find_user_by_email(email).await
    }

    async fn create(&self, new_user: NewUser) -> AppResult<User> {
        self.users.create_user(new_user).await
    }

    async fn set_refresh_token_hash(&self, id: i32, hash: Option<String>) -> AppResult<()> {
        self.users.set_refresh_token_hash(id, hash).await
    }
}
