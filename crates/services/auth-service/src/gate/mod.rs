//! Request gates: who is calling, and may they call this route.

mod authentication;
mod authorization;

pub use authentication::{extract_bearer, AuthenticatedUser, AuthenticationGate};
pub use authorization::{authorize, AccessPolicy, Decision, RoleSet};

use common::AppResult;

/// Run both gates for one request.
///
/// Public routes return `None` without looking at the header. Otherwise the
/// caller is authenticated (`Unauthorized` on failure) and then checked
/// against the policy's roles (`Forbidden` on failure).
pub async fn admit(
    gate: &AuthenticationGate,
    policy: &AccessPolicy,
    header: Option<&str>,
) -> AppResult<Option<AuthenticatedUser>> {
    if policy.is_public() {
        return Ok(None);
    }

    let identity = gate.authenticate(header).await?;
    authorize(&identity, policy.required_roles()).into_result()?;
    Ok(Some(identity))
}
