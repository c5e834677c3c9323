//! Rate limiting middleware.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{error, warn};

use common::AppError;

use crate::state::AppState;

/// Rate limit middleware for general endpoints.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    request: Request,
    next: Next,
) -> Response {
    let limit = state.rate_limit.max_requests;
    let window = state.rate_limit.window_seconds;
    limit_request(state, connect_info, request, next, limit, window).await
}

/// Rate limit middleware for auth endpoints (stricter).
pub async fn rate_limit_auth_middleware(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    request: Request,
    next: Next,
) -> Response {
    let limit = state.rate_limit.auth_max_requests;
    let window = state.rate_limit.auth_window_seconds;
    limit_request(state, connect_info, request, next, limit, window).await
}

async fn limit_request(
    state: AppState,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    request: Request,
    next: Next,
    limit: u64,
    window_seconds: u64,
) -> Response {
    let Some(limiter) = state.rate_limiter.as_ref() else {
        return next.run(request).await;
    };

    let ip = client_ip(request.headers(), connect_info);
    let identifier = format!("{}:{}", request.uri().path(), ip);

    let usage = match limiter.hit(&identifier, limit, window_seconds).await {
        Ok(usage) => usage,
        Err(e) => {
            // Fail closed
            error!("Rate limiter unavailable: {}", e);
            return too_many_requests(limit, window_seconds);
        }
    };

    if !usage.allowed() {
        warn!(client = %ip, "Rate limit exceeded");
        return too_many_requests(limit, window_seconds);
    }

    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert("X-RateLimit-Limit", HeaderValue::from(limit));
    headers.insert("X-RateLimit-Remaining", HeaderValue::from(usage.remaining()));
    response
}

fn client_ip(headers: &HeaderMap, connect_info: Option<ConnectInfo<SocketAddr>>) -> String {
    let forwarded = headers
        .get("X-Forwarded-For")
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty());
    if let Some(ip) = forwarded {
        return ip.to_string();
    }

    if let Some(real_ip) = headers.get("X-Real-IP").and_then(|h| h.to_str().ok()) {
        return real_ip.trim().to_string();
    }

    connect_info
        .map(|ci| ci.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn too_many_requests(limit: u64, window_seconds: u64) -> Response {
    let mut response = AppError::TooManyRequests.into_response();

    let headers = response.headers_mut();
    headers.insert("Retry-After", HeaderValue::from(window_seconds));
    headers.insert("X-RateLimit-Remaining", HeaderValue::from_static("0"));
    headers.insert("X-RateLimit-Limit", HeaderValue::from(limit));

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_ip_prefers_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert("X-Forwarded-For", HeaderValue::from_static("10.0.0.1, 10.0.0.2"));
        headers.insert("X-Real-IP", HeaderValue::from_static("10.0.0.9"));

        assert_eq!(client_ip(&headers, None), "10.0.0.1");
    }

    #[test]
    fn test_client_ip_fallbacks() {
        let mut headers = HeaderMap::new();
        headers.insert("X-Real-IP", HeaderValue::from_static("10.0.0.9"));
        assert_eq!(client_ip(&headers, None), "10.0.0.9");

        let addr: SocketAddr = "192.168.1.5:4000".parse().unwrap();
        assert_eq!(client_ip(&HeaderMap::new(), Some(ConnectInfo(addr))), "192.168.1.5");
        assert_eq!(client_ip(&HeaderMap::new(), None), "unknown");
    }

    #[test]
    fn test_too_many_requests_headers() {
        let response = too_many_requests(10, 60);

        assert_eq!(response.status(), axum::http::StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()["Retry-After"], "60");
        assert_eq!(response.headers()["X-RateLimit-Remaining"], "0");
        assert_eq!(response.headers()["X-RateLimit-Limit"], "10");
    }
}
