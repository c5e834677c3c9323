//! Auth Service Library
//!
//! Token issuance, refresh-token rotation and the request gates. It reads and
//! writes identities through [`client::UserDirectory`] and is embedded in the
//! gateway process.

pub mod client;
pub mod config;
pub mod gate;
pub mod service;

use std::sync::Arc;

use common::AppResult;
use domain::SecretHasher;

use crate::client::UserDirectory;
use crate::config::AuthServiceConfig;
use crate::gate::AuthenticationGate;
use crate::service::{AuthService, Authenticator, HashedRefreshTokenStore, TokenIssuer};

/// Fully wired auth components sharing one issuer and one user directory.
pub struct AuthModule {
    pub service: Arc<dyn AuthService>,
    pub gate: Arc<AuthenticationGate>,
}

impl AuthModule {
    pub fn new(config: &AuthServiceConfig, users: Arc<dyn UserDirectory>) -> AppResult<Self> {
        let hasher = SecretHasher::new(config.hash_cost)?;
        let issuer = Arc::new(TokenIssuer::new(config));
        let refresh_tokens = Arc::new(HashedRefreshTokenStore::new(users.clone(), hasher.clone()));

        let service = Authenticator::new(users.clone(), issuer.clone(), refresh_tokens, hasher)?;
        let gate = AuthenticationGate::new(issuer, users);

        Ok(Self {
            service: Arc::new(service),
            gate: Arc::new(gate),
        })
    }
}
