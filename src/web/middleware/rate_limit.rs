//! Rate limiting middleware.

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{HeaderMap, HeaderValue, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::{
    net::SocketAddr,
    sync::Arc,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use crate::rate_limit::{RateLimitConfig, RateLimitResult, WindowRateLimiter};
use crate::web::error::ApiError;

/// State for rate limiting.
#[derive(Debug)]
pub struct RateLimitState {
    /// Per-caller windows.
    limiter: WindowRateLimiter,
    /// Whether proxy headers identify the caller.
    trust_forwarded_headers: bool,
}

impl RateLimitState {
    /// Create a new rate limit state.
    pub fn new(config: RateLimitConfig, trust_forwarded_headers: bool) -> Self {
        Self {
            limiter: WindowRateLimiter::new(config),
            trust_forwarded_headers,
        }
    }

    /// Check and count a request for the given caller.
    pub fn check(&self, ip: &str) -> RateLimitResult {
        self.limiter.check_and_record(ip)
    }

    /// Start a background task that drops expired windows every `interval`.
    pub fn start_sweep_task(self: Arc<Self>, interval: Duration) {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // Skip the first immediate tick
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let removed = self.limiter.sweep();
                if removed > 0 {
                    tracing::debug!(removed, "Swept expired rate limit windows");
                }
            }
        });
    }

    /// Identify the caller of a request.
    fn client_ip(&self, req: &Request<Body>) -> String {
        if self.trust_forwarded_headers {
            // First entry of the chain is the original client
            if let Some(ip) = req
                .headers()
                .get("X-Forwarded-For")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.split(',').next())
                .map(str::trim)
                .filter(|ip| !ip.is_empty())
            {
                return ip.to_string();
            }

            if let Some(real_ip) = req
                .headers()
                .get("X-Real-IP")
                .and_then(|v| v.to_str().ok())
            {
                return real_ip.trim().to_string();
            }
        }

        if let Some(ConnectInfo(addr)) = req.extensions().get::<ConnectInfo<SocketAddr>>() {
            return addr.ip().to_string();
        }

        "unknown".to_string()
    }
}

/// Rate limiting middleware for the upload endpoint.
///
/// Rejected requests never reach the handler. Every response carries
/// `X-RateLimit-Limit`, `X-RateLimit-Remaining` and `X-RateLimit-Reset`
/// (Unix time in seconds when the caller's window ends).
pub async fn upload_rate_limit(
    state: Arc<RateLimitState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let ip = state.client_ip(&req);
    let limit = state.limiter.config().max_requests;

    match state.check(&ip) {
        RateLimitResult::Allowed {
            remaining,
            reset_after,
        } => {
            let mut response = next.run(req).await;
            insert_limit_headers(response.headers_mut(), limit, remaining, reset_after);
            response
        }
        RateLimitResult::Denied { retry_after } => {
            tracing::warn!(ip = %ip, retry_after_secs = retry_after.as_secs(), "Rate limit exceeded");
            let mut response = ApiError::too_many_requests(retry_after).into_response();
            insert_limit_headers(response.headers_mut(), limit, 0, retry_after);
            response
        }
    }
}

fn insert_limit_headers(headers: &mut HeaderMap, limit: u32, remaining: u32, reset_after: Duration) {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    let reset_at = now + reset_after;
    let reset_secs = reset_at.as_secs() + u64::from(reset_at.subsec_nanos() > 0);

    headers.insert("X-RateLimit-Limit", HeaderValue::from(limit));
    headers.insert("X-RateLimit-Remaining", HeaderValue::from(remaining));
    headers.insert("X-RateLimit-Reset", HeaderValue::from(reset_secs));
}
