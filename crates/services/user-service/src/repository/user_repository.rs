//! User repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, SqlErr,
};

use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use common::{AppError, AppResult};
use domain::{NewUser, UpdateUser, User};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User repository trait for dependency injection.
///
/// Emails are expected in normalized form; normalization is the service's job.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, id: i32) -> AppResult<Option<User>>;

    /// Find user by (normalized) email address
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Find user by phone number
    async fn find_by_phone_number(&self, phone_number: &str) -> AppResult<Option<User>>;

    /// Insert a new user; `password` must already be hashed
    async fn create(&self, new_user: NewUser) -> AppResult<User>;

    /// Apply a partial update
    async fn update(&self, id: i32, changes: UpdateUser) -> AppResult<User>;

    /// Overwrite (or clear) the stored refresh token hash in a single UPDATE.
    /// Returns `NotFound` when no row was affected.
    async fn set_refresh_token_hash(&self, id: i32, hash: Option<String>) -> AppResult<()>;

    /// Delete user by ID
    async fn delete(&self, id: i32) -> AppResult<()>;

    /// List all users ordered by ID
    async fn list(&self) -> AppResult<Vec<User>>;
}

/// SeaORM-backed implementation of UserRepository.
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Map unique-constraint violations to `Conflict`, everything else to `Database`.
fn write_error(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => {
            if detail.contains("phone") {
                AppError::conflict("Phone number")
            } else {
                AppError::conflict("Email")
            }
        }
        _ => AppError::from(err),
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<User>> {
        let result = UserEntity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(User::from))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?;

        Ok(result.map(User::from))
    }

    async fn find_by_phone_number(&self, phone_number: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::PhoneNumber.eq(phone_number))
            .one(&self.db)
            .await?;

        Ok(result.map(User::from))
    }

    async fn create(&self, new_user: NewUser) -> AppResult<User> {
        let now = Utc::now();
        let active_model = ActiveModel {
            full_name: Set(new_user.full_name),
            email: Set(new_user.email),
            address: Set(new_user.address),
            password_hash: Set(new_user.password),
            phone_number: Set(new_user.phone_number),
            role: Set(new_user.role.to_string()),
            refresh_token_hash: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active_model.insert(&self.db).await.map_err(write_error)?;
        Ok(User::from(model))
    }

    async fn update(&self, id: i32, changes: UpdateUser) -> AppResult<User> {
        let user = UserEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: ActiveModel = user.into();

        if let Some(full_name) = changes.full_name {
            active.full_name = Set(full_name);
        }
        if let Some(address) = changes.address {
            active.address = Set(address);
        }
        if let Some(phone_number) = changes.phone_number {
            active.phone_number = Set(phone_number);
        }
        if let Some(role) = changes.role {
            active.role = Set(role.to_string());
        }
        active.updated_at = Set(Utc::now());

        let model = active.update(&self.db).await.map_err(write_error)?;
        Ok(User::from(model))
    }

    async fn set_refresh_token_hash(&self, id: i32, hash: Option<String>) -> AppResult<()> {
        let result = UserEntity::update_many()
            .col_expr(user::Column::RefreshTokenHash, Expr::value(hash))
            .col_expr(user::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(user::Column::Id.eq(id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let result = UserEntity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        let models = UserEntity::find()
            .order_by_asc(user::Column::Id)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(User::from).collect())
    }
}
