//! OpenAPI documentation.

use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

use auth_service_lib::service::TokenPair;
use domain::{UserResponse, UserRole};

use crate::handlers::auth_handler::{
    MessageResponse, RefreshRequest, RegisterRequest, SignInRequest,
};
use crate::handlers::health_handler::{HealthResponse, ServiceHealth, ServiceStatus};
use crate::handlers::user_handler::UpdateUserRequest;

/// API documentation struct.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health_handler::health_check,
        crate::handlers::auth_handler::register,
        crate::handlers::auth_handler::sign_in,
        crate::handlers::auth_handler::refresh,
        crate::handlers::auth_handler::sign_out,
        crate::handlers::user_handler::get_current_user,
        crate::handlers::user_handler::list_users,
        crate::handlers::user_handler::get_user,
        crate::handlers::user_handler::update_user,
        crate::handlers::user_handler::delete_user,
    ),
    components(
        schemas(
            RegisterRequest,
            SignInRequest,
            RefreshRequest,
            MessageResponse,
            TokenPair,
            UserResponse,
            UserRole,
            UpdateUserRequest,
            HealthResponse,
            ServiceStatus,
            ServiceHealth,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness of the gateway and its backing stores"),
        (name = "Authentication", description = "Registration, sign-in and token rotation"),
        (name = "Users", description = "User management endpoints"),
    )
)]
pub struct ApiDoc;

/// Security scheme modifier.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_routes_and_scheme() {
        let doc = ApiDoc::openapi();

        for path in [
            "/api/v1/health",
            "/api/v1/auth/signin",
            "/api/v1/auth/refresh",
            "/api/v1/users/{id}",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }

        let components = doc.components.unwrap();
        assert!(components.security_schemes.contains_key("bearer_auth"));
        assert!(components.schemas.contains_key("TokenPair"));
    }
}
