//! Health check handlers.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub services: ServiceStatus,
}

/// Individual service status.
#[derive(Debug, Serialize, ToSchema)]
pub struct ServiceStatus {
    pub database: ServiceHealth,
    pub redis: ServiceHealth,
}

/// Service health with optional error message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ServiceHealth {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ServiceHealth {
    fn from_check<E: ToString>(result: Option<Result<(), E>>) -> Self {
        let (status, error) = match result {
            None => ("disabled", None),
            Some(Ok(())) => ("healthy", None),
            Some(Err(e)) => ("unhealthy", Some(e.to_string())),
        };
        Self {
            status: status.to_string(),
            error,
        }
    }

    fn is_unhealthy(&self) -> bool {
        self.status == "unhealthy"
    }
}

/// Create health routes.
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

/// Health check endpoint - verifies database and Redis connectivity.
#[utoipa::path(
    get,
    path = "/api/v1/health",
    tag = "Health",
    responses(
        (status = 200, description = "All configured components reachable", body = HealthResponse),
        (status = 503, description = "A component is unreachable", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<AppState>) -> Response {
    let database = match &state.database {
        Some(db) => Some(db.ping().await),
        None => None,
    };
    let redis = match &state.rate_limiter {
        Some(limiter) => Some(limiter.ping().await),
        None => None,
    };

    let services = ServiceStatus {
        database: ServiceHealth::from_check(database),
        redis: ServiceHealth::from_check(redis),
    };
    let degraded = services.database.is_unhealthy() || services.redis.is_unhealthy();

    let response = HealthResponse {
        status: if degraded { "degraded" } else { "healthy" }.to_string(),
        services,
    };

    if degraded {
        (StatusCode::SERVICE_UNAVAILABLE, Json(response)).into_response()
    } else {
        (StatusCode::OK, Json(response)).into_response()
    }
}
