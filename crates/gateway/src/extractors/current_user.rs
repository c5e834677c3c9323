//! Extractor for the identity attached by the access gate.

use std::ops::Deref;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use auth_service_lib::gate::AuthenticatedUser;
use common::AppError;

/// The caller of a gated route.
///
/// Only present behind a non-public policy; on a public route extraction
/// fails with `Unauthorized`.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub AuthenticatedUser);

impl Deref for CurrentUser {
    type Target = AuthenticatedUser;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .map(CurrentUser)
            .ok_or(AppError::Unauthorized)
    }
}
