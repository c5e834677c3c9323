//! Authentication service business logic.

mod auth_service;
mod refresh_store;
mod token_issuer;

pub use auth_service::{AuthService, Authenticator};
pub use refresh_store::{HashedRefreshTokenStore, RefreshTokenStore};
pub use token_issuer::{Claims, TokenError, TokenIssuer, TokenKind, TokenPair};
