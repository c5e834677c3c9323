//! Auth service configuration.
//!
//! Everything here is checked once at startup. A bad secret or an
//! unparseable expiration is a [`ConfigError`] and the process does not boot.

use std::fmt;
use std::time::Duration;

use common::{parse_duration, parse_or, process_env, require, ConfigError};
use domain::{
    HashCost, DEFAULT_ACCESS_TOKEN_EXPIRATION, DEFAULT_REFRESH_TOKEN_EXPIRATION,
    MAX_TOKEN_EXPIRATION_SECS, MIN_JWT_SECRET_LENGTH,
};

const ACCESS_SECRET_KEY: &str = "JWT_ACCESS_TOKEN_SECRET";
const ACCESS_EXPIRATION_KEY: &str = "JWT_ACCESS_TOKEN_EXPIRATION_TIME";
const REFRESH_SECRET_KEY: &str = "JWT_REFRESH_TOKEN_SECRET";
const REFRESH_EXPIRATION_KEY: &str = "JWT_REFRESH_TOKEN_EXPIRATION_TIME";

/// Signing secret and lifetime for one kind of token.
#[derive(Clone)]
pub struct TokenSettings {
    pub secret: String,
    pub ttl: Duration,
}

impl fmt::Debug for TokenSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSettings")
            .field("secret", &"[REDACTED]")
            .field("ttl", &self.ttl)
            .finish()
    }
}

/// Auth service configuration.
#[derive(Debug, Clone)]
pub struct AuthServiceConfig {
    /// Access token secret and lifetime
    pub access: TokenSettings,
    /// Refresh token secret and lifetime
    pub refresh: TokenSettings,
    /// Argon2 cost for passwords and refresh token hashes
    pub hash_cost: HashCost,
}

impl AuthServiceConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(process_env)
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let access = TokenSettings {
            secret: signing_secret(&lookup, ACCESS_SECRET_KEY)?,
            ttl: expiration(&lookup, ACCESS_EXPIRATION_KEY, DEFAULT_ACCESS_TOKEN_EXPIRATION)?,
        };
        let refresh = TokenSettings {
            secret: signing_secret(&lookup, REFRESH_SECRET_KEY)?,
            ttl: expiration(
                &lookup,
                REFRESH_EXPIRATION_KEY,
                DEFAULT_REFRESH_TOKEN_EXPIRATION,
            )?,
        };

        if access.secret == refresh.secret {
            return Err(ConfigError::invalid(
                REFRESH_SECRET_KEY,
                format!("must differ from {}", ACCESS_SECRET_KEY),
            ));
        }

        Ok(Self {
            access,
            refresh,
            hash_cost: hash_cost(&lookup)?,
        })
    }
}

fn signing_secret<F>(lookup: &F, key: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let secret = require(lookup, key)?;
    if secret.len() < MIN_JWT_SECRET_LENGTH {
        return Err(ConfigError::invalid(
            key,
            format!("must be at least {} bytes", MIN_JWT_SECRET_LENGTH),
        ));
    }
    Ok(secret)
}

fn expiration<F>(lookup: &F, key: &'static str, default: &str) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key).unwrap_or_else(|| default.to_string());
    let ttl = parse_duration(&raw).ok_or_else(|| {
        ConfigError::invalid(key, format!("'{}' is not a positive duration", raw))
    })?;

    if ttl.as_secs() > MAX_TOKEN_EXPIRATION_SECS {
        return Err(ConfigError::invalid(
            key,
            format!("must not exceed {} seconds", MAX_TOKEN_EXPIRATION_SECS),
        ));
    }
    Ok(ttl)
}

fn hash_cost<F>(lookup: &F) -> Result<HashCost, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let defaults = HashCost::default();
    let cost = HashCost {
        memory_kib: parse_or(lookup, "HASH_MEMORY_KIB", defaults.memory_kib)?,
        iterations: parse_or(lookup, "HASH_ITERATIONS", defaults.iterations)?,
        parallelism: parse_or(lookup, "HASH_PARALLELISM", defaults.parallelism)?,
    };

    cost.params()
        .map_err(|e| ConfigError::invalid("HASH_MEMORY_KIB", e.to_string()))?;
    Ok(cost)
}
