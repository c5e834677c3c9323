//! Application state for dependency injection.

use std::sync::Arc;

use auth_service_lib::gate::AuthenticationGate;
use auth_service_lib::service::AuthService;
use common::RateLimitConfig;
use user_service_lib::infra::Database;
use user_service_lib::UserService;

use crate::middleware::RateLimiter;
use crate::routes::AccessTable;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<dyn AuthService>,
    pub gate: Arc<AuthenticationGate>,
    pub users: Arc<dyn UserService>,
    pub access: Arc<AccessTable>,
    /// `None` when rate limiting is disabled
    pub rate_limiter: Option<RateLimiter>,
    pub rate_limit: RateLimitConfig,
    /// `None` when running without a database handle (tests)
    pub database: Option<Database>,
}

impl AppState {
    /// Create new app state.
    pub fn new(
        auth: Arc<dyn AuthService>,
        gate: Arc<AuthenticationGate>,
        users: Arc<dyn UserService>,
        access: AccessTable,
        rate_limit: RateLimitConfig,
    ) -> Self {
        Self {
            auth,
            gate,
            users,
            access: Arc::new(access),
            rate_limiter: None,
            rate_limit,
            database: None,
        }
    }

    pub fn with_rate_limiter(mut self, limiter: RateLimiter) -> Self {
        self.rate_limiter = Some(limiter);
        self
    }

    pub fn with_database(mut self, database: Database) -> Self {
        self.database = Some(database);
        self
    }
}
