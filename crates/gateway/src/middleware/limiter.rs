//! Redis fixed-window request counters.

use redis::{aio::ConnectionManager, AsyncCommands, RedisError};
use tracing::debug;

use common::AppResult;

/// Key prefix for rate limit counters
const KEY_PREFIX: &str = "rate_limit:";

/// Outcome of one counter increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowUsage {
    pub count: u64,
    pub limit: u64,
}

impl WindowUsage {
    pub fn allowed(&self) -> bool {
        self.count <= self.limit
    }

    pub fn remaining(&self) -> u64 {
        self.limit.saturating_sub(self.count)
    }
}

/// Redis-backed rate limiter.
#[derive(Clone)]
pub struct RateLimiter {
    conn: ConnectionManager,
}

impl RateLimiter {
    /// Connect to Redis.
    pub async fn connect(url: &str) -> Result<Self, RedisError> {
        let client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        debug!("Rate limiter connected to Redis");
        Ok(Self { conn })
    }

    /// Count one request against `identifier` in the current window.
    ///
    /// The window starts with the first request and expires after
    /// `window_seconds`. Redis failures are returned, not swallowed.
    pub async fn hit(
        &self,
        identifier: &str,
        limit: u64,
        window_seconds: u64,
    ) -> AppResult<WindowUsage> {
        let key = format!("{}{}", KEY_PREFIX, identifier);
        let mut conn = self.conn.clone();

        let count: u64 = conn.incr(&key, 1u64).await?;
        if count == 1 {
            conn.expire::<_, ()>(&key, window_seconds as i64).await?;
        }

        Ok(WindowUsage { count, limit })
    }

    /// Round-trip to Redis.
    pub async fn ping(&self) -> AppResult<()> {
        let mut conn = self.conn.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}
