//! Per-route access control.

use axum::{
    extract::{MatchedPath, Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use tracing::debug;

use auth_service_lib::gate::admit;
use common::AppError;

use crate::state::AppState;

/// Look up the matched route's policy and run the gates.
///
/// On success the caller's `AuthenticatedUser` (if any) is stored in the
/// request extensions for the `CurrentUser` extractor.
pub async fn access_gate(
    State(state): State<AppState>,
    matched_path: MatchedPath,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let policy = state.access.policy_for(request.method(), matched_path.as_str());
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(str::to_owned);

    if let Some(identity) = admit(&state.gate, policy, header.as_deref()).await? {
        debug!(
            user_id = identity.id,
            role = %identity.role,
            path = matched_path.as_str(),
            "Request admitted"
        );
        request.extensions_mut().insert(identity);
    }

    Ok(next.run(request).await)
}
