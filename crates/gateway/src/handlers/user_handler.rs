//! User handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use common::{AppError, AppResult};
use domain::{
    UpdateUser, UserResponse, UserRole, MAX_ADDRESS_LENGTH, MAX_FULL_NAME_LENGTH,
    MIN_ADDRESS_LENGTH, MIN_FULL_NAME_LENGTH,
};

use super::auth_handler::{FULL_NAME, PHONE_NUMBER};
use crate::extractors::{CurrentUser, ValidatedJson};
use crate::state::AppState;

/// Partial profile update
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    #[validate(
        length(
            min = MIN_FULL_NAME_LENGTH,
            max = MAX_FULL_NAME_LENGTH,
            message = "Full name must be between 2 and 100 characters long"
        ),
        regex(path = *FULL_NAME, message = "Full name must contain only letters and spaces")
    )]
    #[schema(example = "Jane Wanjiru")]
    pub full_name: Option<String>,
    #[validate(length(
        min = MIN_ADDRESS_LENGTH,
        max = MAX_ADDRESS_LENGTH,
        message = "Address must be between 5 and 500 characters long"
    ))]
    pub address: Option<String>,
    #[validate(regex(
        path = *PHONE_NUMBER,
        message = "Please provide a valid phone number in the format +2547XXXXXXXX"
    ))]
    pub phone_number: Option<String>,
    /// New role (admin only)
    #[schema(example = "driver")]
    pub role: Option<UserRole>,
}

impl From<UpdateUserRequest> for UpdateUser {
    fn from(req: UpdateUserRequest) -> Self {
        UpdateUser {
            full_name: req.full_name,
            address: req.address,
            phone_number: req.phone_number,
            role: req.role,
        }
    }
}

/// Create user routes
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users))
        .route("/me", get(get_current_user))
        .route("/:id", get(get_user).patch(update_user).delete(delete_user))
}

/// Get current authenticated user
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user profile", body = UserResponse),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_current_user(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<UserResponse>> {
    let user = state.users.get_user(current_user.id).await?;
    Ok(Json(UserResponse::from(user)))
}

/// List all users (admin only)
#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "List of all users", body = Vec<UserResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin only")
    )
)]
pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<Vec<UserResponse>>> {
    let users = state.users.list_users().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Get user by ID (admin only)
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User profile", body = UserResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<UserResponse>> {
    let user = state.users.get_user(id).await?;
    Ok(Json(UserResponse::from(user)))
}

/// Update user (own profile, or any profile and role as admin)
#[utoipa::path(
    patch,
    path = "/api/v1/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated successfully", body = UserResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Can only update own profile; role changes are admin only"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Phone number already registered")
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<UpdateUserRequest>,
) -> AppResult<Json<UserResponse>> {
    if !current_user.is_admin() && (current_user.id != id || payload.role.is_some()) {
        return Err(AppError::Forbidden);
    }

    let user = state.users.update_user(id, payload.into()).await?;
    Ok(Json(UserResponse::from(user)))
}

/// Delete user (admin only, cannot delete self)
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 204, description = "User deleted successfully"),
        (status = 400, description = "Cannot delete your own account"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "User not found")
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    if current_user.id == id {
        return Err(AppError::validation("Cannot delete your own account"));
    }

    state.users.delete_user(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty() -> UpdateUserRequest {
        UpdateUserRequest {
            full_name: None,
            address: None,
            phone_number: None,
            role: None,
        }
    }

    #[test]
    fn test_absent_fields_skip_validation() {
        assert!(empty().validate().is_ok());
    }

    #[test]
    fn test_length_bounds() {
        let short_name = UpdateUserRequest {
            full_name: Some("a".repeat(MIN_FULL_NAME_LENGTH as usize - 1)),
            ..empty()
        };
        let long_address = UpdateUserRequest {
            address: Some("a".repeat(MAX_ADDRESS_LENGTH as usize + 1)),
            ..empty()
        };
        let shortest = UpdateUserRequest {
            full_name: Some("a".repeat(MIN_FULL_NAME_LENGTH as usize)),
            address: Some("a".repeat(MIN_ADDRESS_LENGTH as usize)),
            ..empty()
        };

        assert!(short_name.validate().is_err());
        assert!(long_address.validate().is_err());
        assert!(shortest.validate().is_ok());
    }
}
