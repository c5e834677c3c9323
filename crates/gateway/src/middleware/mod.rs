//! Middleware for access control and rate limiting.

mod access;
mod limiter;
mod rate_limit;

pub use access::access_gate;
pub use limiter::{RateLimiter, WindowUsage};
pub use rate_limit::{rate_limit_auth_middleware, rate_limit_middleware};
