//! Route configuration and the access policy table.

use std::collections::HashMap;

use axum::{http::Method, middleware, Router};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use auth_service_lib::gate::AccessPolicy;
use domain::{DomainResult, UserRole};

use crate::handlers::{auth_routes, health_routes, user_routes};
use crate::middleware::{access_gate, rate_limit_auth_middleware, rate_limit_middleware};
use crate::openapi::ApiDoc;
use crate::state::AppState;

/// Version prefix for every API route
pub const API_PREFIX: &str = "/api/v1";

/// Access policy per `(method, route template)`.
///
/// Templates are the full matched path, e.g. `/api/v1/users/:id`. Routes
/// missing from the table require any authenticated caller.
#[derive(Debug, Clone)]
pub struct AccessTable {
    policies: HashMap<(Method, String), AccessPolicy>,
    fallback: AccessPolicy,
}

impl AccessTable {
    pub fn new() -> Self {
        Self {
            policies: HashMap::new(),
            fallback: AccessPolicy::AnyAuthenticated,
        }
    }

    /// Declare the policy for a route below [`API_PREFIX`].
    pub fn declare(mut self, method: Method, path: &str, policy: AccessPolicy) -> Self {
        self.policies
            .insert((method, format!("{}{}", API_PREFIX, path)), policy);
        self
    }

    pub fn policy_for(&self, method: &Method, template: &str) -> &AccessPolicy {
        self.policies
            .get(&(method.clone(), template.to_string()))
            .unwrap_or(&self.fallback)
    }
}

impl Default for AccessTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Who may call what.
pub fn access_table() -> DomainResult<AccessTable> {
    let admin = || AccessPolicy::roles([UserRole::Admin]);
    let any_role = AccessPolicy::roles([UserRole::Admin, UserRole::User, UserRole::Driver])?;

    Ok(AccessTable::new()
        .declare(Method::GET, "/health", AccessPolicy::Public)
        .declare(Method::POST, "/auth/register", AccessPolicy::Public)
        .declare(Method::POST, "/auth/signin", AccessPolicy::Public)
        .declare(Method::POST, "/auth/refresh", AccessPolicy::Public)
        .declare(Method::POST, "/auth/signout", AccessPolicy::AnyAuthenticated)
        .declare(Method::GET, "/users/me", AccessPolicy::AnyAuthenticated)
        .declare(Method::GET, "/users", admin()?)
        .declare(Method::GET, "/users/:id", admin()?)
        .declare(Method::PATCH, "/users/:id", any_role)
        .declare(Method::DELETE, "/users/:id", admin()?))
}

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        // Health check (no rate limit)
        .merge(health_routes())
        // Auth routes (stricter rate limit)
        .nest(
            "/auth",
            auth_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                rate_limit_auth_middleware,
            )),
        )
        // User routes (general rate limit)
        .nest(
            "/users",
            user_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                rate_limit_middleware,
            )),
        );

    Router::new()
        .nest(API_PREFIX, api)
        .route_layer(middleware::from_fn_with_state(state.clone(), access_gate))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
}
