//! Authentication gate: bearer token to live identity.

use std::sync::Arc;

use tracing::{debug, warn};

use common::{AppError, AppResult};
use domain::{UserRole, BEARER_SCHEME};

use crate::client::UserDirectory;
use crate::service::{TokenIssuer, TokenKind};

/// Identity attached to a request once the gate has let it through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: i32,
    pub email: String,
    pub role: UserRole,
}

impl AuthenticatedUser {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Pull the token out of an `Authorization` header value.
///
/// The scheme is matched case-insensitively; an empty token is no token.
pub fn extract_bearer(header: Option<&str>) -> Option<&str> {
    let (scheme, token) = header?.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return None;
    }

    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Validates access tokens and resolves them against the user store.
pub struct AuthenticationGate {
    issuer: Arc<TokenIssuer>,
    users: Arc<dyn UserDirectory>,
}

impl AuthenticationGate {
    pub fn new(issuer: Arc<TokenIssuer>, users: Arc<dyn UserDirectory>) -> Self {
        Self { issuer, users }
    }

    /// Resolve the caller from the raw `Authorization` header.
    ///
    /// Role and email come from the stored record, not from the token, so a
    /// role change takes effect on the next request.
    pub async fn authenticate(&self, header: Option<&str>) -> AppResult<AuthenticatedUser> {
        let token = extract_bearer(header).ok_or_else(|| {
            debug!("Missing or malformed Authorization header");
            AppError::Unauthorized
        })?;

        let claims = self.issuer.verify(token, TokenKind::Access).map_err(|e| {
            warn!("Access token rejected: {}", e);
            AppError::Unauthorized
        })?;

        let user = self.users.find_by_id(claims.sub).await?.ok_or_else(|| {
            warn!(user_id = claims.sub, "Access token for unknown user");
            AppError::Unauthorized
        })?;

        Ok(AuthenticatedUser {
            id: user.id,
            email: user.email,
            role: user.role,
        })
    }
}
