//! User (identity) domain entity and related types.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{ROLE_ADMIN, ROLE_DRIVER, ROLE_USER};
use crate::error::DomainError;

/// Closed set of roles an identity can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    User,
    Driver,
}

impl UserRole {
    /// Check if this role has admin privileges
    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }

    /// Lowercase wire/storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => ROLE_ADMIN,
            UserRole::User => ROLE_USER,
            UserRole::Driver => ROLE_DRIVER,
        }
    }
}

impl Default for UserRole {
    fn default() -> Self {
        UserRole::User
    }
}

impl FromStr for UserRole {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ROLE_ADMIN => Ok(UserRole::Admin),
            ROLE_USER => Ok(UserRole::User),
            ROLE_DRIVER => Ok(UserRole::Driver),
            other => Err(DomainError::InvalidRole(other.to_string())),
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalize an email address into its login-handle form.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Identity record as stored by the user service.
#[derive(Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i32,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub full_name: String,
    pub address: String,
    pub phone_number: String,
    pub role: UserRole,
    /// Hash of the most recently issued refresh token (None = no active session)
    #[serde(skip_serializing)]
    pub refresh_token_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Hashes stay out of logs.
impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password_hash", &"[REDACTED]")
            .field("full_name", &self.full_name)
            .field("role", &self.role)
            .field(
                "refresh_token_hash",
                &self.refresh_token_hash.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl User {
    /// Check if user has admin role
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Whether a refresh token is currently stored for this identity.
    pub fn has_active_session(&self) -> bool {
        self.refresh_token_hash.is_some()
    }
}

/// Registration input (plaintext password, not yet validated).
#[derive(Clone, Deserialize)]
pub struct CreateUser {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub address: String,
    pub phone_number: String,
}

impl fmt::Debug for CreateUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateUser")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("full_name", &self.full_name)
            .finish()
    }
}

/// Insert payload handed to the repository.
///
/// `password` is either plaintext or an already-computed hash; the user
/// service hashes it only when it is not hashed yet.
#[derive(Clone)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub address: String,
    pub phone_number: String,
    pub role: UserRole,
}

impl NewUser {
    /// Trim every text field and normalize the email.
    pub fn normalized(self) -> Self {
        Self {
            email: normalize_email(&self.email),
            password: self.password,
            full_name: self.full_name.trim().to_string(),
            address: self.address.trim().to_string(),
            phone_number: self.phone_number.trim().to_string(),
            role: self.role,
        }
    }
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("role", &self.role)
            .finish()
    }
}

/// Partial profile update. `role` is only honoured on the admin path.
#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub full_name: Option<String>,
    pub address: Option<String>,
    pub phone_number: Option<String>,
    pub role: Option<UserRole>,
}

impl UpdateUser {
    /// Trim every provided text field.
    pub fn normalized(self) -> Self {
        Self {
            full_name: self.full_name.map(|v| v.trim().to_string()),
            address: self.address.map(|v| v.trim().to_string()),
            phone_number: self.phone_number.map(|v| v.trim().to_string()),
            role: self.role,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.address.is_none()
            && self.phone_number.is_none()
            && self.role.is_none()
    }
}

/// User response (safe to return to client)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UserResponse {
    /// Unique user identifier
    pub id: i32,
    /// Normalized email address
    pub email: String,
    /// Display name
    pub full_name: String,
    /// Delivery address
    pub address: String,
    /// Contact phone number
    pub phone_number: String,
    /// User role
    pub role: UserRole,
    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            address: user.address,
            phone_number: user.phone_number,
            role: user.role,
            created_at: user.created_at,
        }
    }
}
