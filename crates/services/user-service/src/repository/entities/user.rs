//! User database entity for SeaORM.

use sea_orm::entity::prelude::*;

use domain::{User, UserRole};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub full_name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub address: String,
    pub password_hash: String,
    #[sea_orm(unique)]
    pub phone_number: String,
    pub role: String,
    /// Hash of the current refresh token (NULL = signed out)
    pub refresh_token_hash: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Convert database model to domain entity.
///
/// The column is constrained by the application, so an unknown value can
/// only come from a manual edit; it degrades to the least-privileged role.
impl From<Model> for User {
    fn from(model: Model) -> Self {
        let role = model.role.parse().unwrap_or_else(|_| {
            tracing::warn!(user_id = model.id, role = %model.role, "Unknown role in users table");
            UserRole::User
        });

        User {
            id: model.id,
            email: model.email,
            password_hash: model.password_hash,
            full_name: model.full_name,
            address: model.address,
            phone_number: model.phone_number,
            role,
            refresh_token_hash: model.refresh_token_hash,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
