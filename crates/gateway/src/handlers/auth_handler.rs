//! Authentication handlers.

use axum::{extract::State, http::StatusCode, response::Json, routing::post, Router};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use auth_service_lib::service::TokenPair;
use common::AppResult;
use domain::{
    CreateUser, UserResponse, MAX_ADDRESS_LENGTH, MAX_EMAIL_LENGTH, MAX_FULL_NAME_LENGTH,
    MAX_PASSWORD_LENGTH, MIN_ADDRESS_LENGTH, MIN_FULL_NAME_LENGTH, MIN_PASSWORD_LENGTH,
};

use crate::extractors::{CurrentUser, ValidatedJson};
use crate::state::AppState;

/// Kenyan mobile numbers in international form
pub static PHONE_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+2547\d{8}$").expect("phone number pattern is valid"));

/// Letters and spaces only
pub static FULL_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z\s]+$").expect("full name pattern is valid"));

/// Customer registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(
        email(message = "Please provide a valid email address"),
        length(max = MAX_EMAIL_LENGTH, message = "Email must not exceed 255 characters")
    )]
    #[schema(example = "jane@example.com")]
    pub email: String,
    #[validate(length(
        min = MIN_PASSWORD_LENGTH,
        max = MAX_PASSWORD_LENGTH,
        message = "Password must be between 6 and 128 characters long"
    ))]
    #[schema(example = "Secret1!", min_length = 6)]
    pub password: String,
    #[validate(
        length(
            min = MIN_FULL_NAME_LENGTH,
            max = MAX_FULL_NAME_LENGTH,
            message = "Full name must be between 2 and 100 characters long"
        ),
        regex(path = *FULL_NAME, message = "Full name must contain only letters and spaces")
    )]
    #[schema(example = "Jane Wanjiru")]
    pub full_name: String,
    #[validate(length(
        min = MIN_ADDRESS_LENGTH,
        max = MAX_ADDRESS_LENGTH,
        message = "Address must be between 5 and 500 characters long"
    ))]
    #[schema(example = "12 Moi Avenue, Nairobi")]
    pub address: String,
    #[validate(regex(
        path = *PHONE_NUMBER,
        message = "Please provide a valid phone number in the format +2547XXXXXXXX"
    ))]
    #[schema(example = "+254712345678")]
    pub phone_number: String,
}

impl From<RegisterRequest> for CreateUser {
    fn from(req: RegisterRequest) -> Self {
        CreateUser {
            email: req.email,
            password: req.password,
            full_name: req.full_name,
            address: req.address,
            phone_number: req.phone_number,
        }
    }
}

/// Sign-in request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SignInRequest {
    #[validate(email(message = "Please provide a valid email address"))]
    #[schema(example = "jane@example.com")]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    #[schema(example = "Secret1!")]
    pub password: String,
}

/// Token refresh request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RefreshRequest {
    #[schema(example = 1)]
    pub user_id: i32,
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

/// Plain confirmation message
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// Create authentication routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/signin", post(sign_in))
        .route("/refresh", post(refresh))
        .route("/signout", post(sign_out))
}

/// Register a new customer account
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    tag = "Authentication",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered successfully", body = UserResponse),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Email or phone number already registered")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let user = state.auth.register(payload.into()).await?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// Sign in and receive an access/refresh token pair
#[utoipa::path(
    post,
    path = "/api/v1/auth/signin",
    tag = "Authentication",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Signed in", body = TokenPair),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn sign_in(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<SignInRequest>,
) -> AppResult<Json<TokenPair>> {
    let pair = state.auth.sign_in(&payload.email, &payload.password).await?;
    Ok(Json(pair))
}

/// Exchange the current refresh token for a new pair
#[utoipa::path(
    post,
    path = "/api/v1/auth/refresh",
    tag = "Authentication",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New token pair", body = TokenPair),
        (status = 401, description = "Refresh token invalid, expired or rotated out"),
        (status = 404, description = "User not found")
    )
)]
pub async fn refresh(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RefreshRequest>,
) -> AppResult<Json<TokenPair>> {
    let pair = state
        .auth
        .refresh(payload.user_id, &payload.refresh_token)
        .await?;
    Ok(Json(pair))
}

/// Sign out, invalidating the stored refresh token
#[utoipa::path(
    post,
    path = "/api/v1/auth/signout",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Signed out", body = MessageResponse),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn sign_out(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<MessageResponse>> {
    state.auth.sign_out(current_user.id).await?;
    Ok(Json(MessageResponse {
        message: format!("User with id {} signed out successfully", current_user.id),
    }))
}
