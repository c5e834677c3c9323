//! Domain-level errors.
//!
//! These errors represent rule violations inside the domain layer. They are
//! independent of infrastructure concerns (HTTP, database) and get mapped to
//! `common::AppError` at the service boundary.

use thiserror::Error;

/// Domain-specific errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Validation failed for a field or input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Password does not satisfy the password policy
    #[error("Password error: {0}")]
    Password(String),

    /// Role value outside the closed role set
    #[error("Unknown role: {0}")]
    InvalidRole(String),

    /// Hash cost parameters rejected by Argon2
    #[error("Invalid hash cost: {0}")]
    InvalidHashCost(String),

    /// Hashing primitive failed
    #[error("Hashing failed: {0}")]
    Hashing(String),
}

impl DomainError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        DomainError::Validation(msg.into())
    }

    /// Create a password error
    pub fn password(msg: impl Into<String>) -> Self {
        DomainError::Password(msg.into())
    }

    /// Create a hashing error
    pub fn hashing(msg: impl Into<String>) -> Self {
        DomainError::Hashing(msg.into())
    }
}

/// Result type alias for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
