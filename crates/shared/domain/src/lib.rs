//! Domain layer - Identity entity, roles and credential hashing.
//!
//! This crate contains pure domain logic with no infrastructure dependencies.

pub mod constants;
pub mod error;
pub mod password;
pub mod user;

pub use constants::*;
pub use error::{DomainError, DomainResult};
pub use password::{HashCost, Password, SecretHasher};
pub use user::{normalize_email, CreateUser, NewUser, UpdateUser, User, UserResponse, UserRole};
