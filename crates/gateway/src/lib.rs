//! API Gateway Library
//!
//! The HTTP surface of the grocery delivery backend. Authentication and user
//! management run in-process; every route passes through the access gate.

pub mod config;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::trace::TraceLayer;
use tracing::info;

use auth_service_lib::client::EmbeddedUserClient;
use auth_service_lib::AuthModule;
use domain::SecretHasher;
use user_service_lib::infra::Database;

use crate::config::GatewayConfig;
use crate::middleware::RateLimiter;
use crate::routes::{access_table, create_router};
use crate::state::AppState;

/// Connect the backing stores, wire the services and build the app state.
pub async fn build_state(config: &GatewayConfig) -> Result<AppState, Box<dyn std::error::Error>> {
    let database = Database::connect(&config.database).await?;

    let hasher = SecretHasher::new(config.auth.hash_cost)?;
    let users = user_service_lib::user_service(&database, hasher);
    let auth = AuthModule::new(
        &config.auth,
        Arc::new(EmbeddedUserClient::new(users.clone())),
    )?;

    let mut state = AppState::new(
        auth.service,
        auth.gate,
        users,
        access_table()?,
        config.rate_limit.clone(),
    )
    .with_database(database);

    if config.rate_limit.enabled {
        state = state.with_rate_limiter(RateLimiter::connect(&config.redis_url).await?);
        info!(
            requests = config.rate_limit.max_requests,
            window_seconds = config.rate_limit.window_seconds,
            "Rate limiting enabled"
        );
    } else {
        info!("Rate limiting disabled");
    }

    Ok(state)
}

/// Run the HTTP server until it is stopped.
pub async fn run(host: &str, port: u16, config: GatewayConfig) -> Result<(), Box<dyn std::error::Error>> {
    let state = build_state(&config).await?;

    let app = create_router(state).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Gateway listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
