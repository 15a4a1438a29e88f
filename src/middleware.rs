use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    Json,
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use tracing::{error, warn};

use crate::config::RateLimitConfig;
use crate::key;
use crate::metrics::{ALLOWED_TOTAL, BLOCKED_TOTAL, CHECK_LATENCY, CHECK_TOTAL, TRACKER_COUNT};
use crate::rate_limit::Decision;
use crate::state::AppState;

/// Identity resolved by an upstream auth layer. When present as a request
/// extension, throttling is keyed on the user instead of the client IP.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: String,
}

/// Rate limit middleware. Mounted per route group via
/// `middleware::from_fn_with_state((state, preset), rate_limit)` so each
/// group carries its own limits over the shared registry.
pub async fn rate_limit(
    State((state, config)): State<(Arc<AppState>, RateLimitConfig)>,
    req: Request,
    next: Next,
) -> Response {
    CHECK_TOTAL.inc();

    let path = req.uri().path().to_string();
    let identity = req.extensions().get::<AuthUser>().map(|u| u.id.clone());
    let remote = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0);
    let ip = key::client_ip(req.headers(), remote);
    let rate_key = key::rate_key(identity.as_deref(), &ip, &path);

    let now = Utc::now();
    let start_time = Instant::now();
    let decision = state.limiter.check_and_record(&rate_key, &config, now);
    CHECK_LATENCY.observe(start_time.elapsed().as_secs_f64());
    TRACKER_COUNT.set(state.limiter.tracker_count() as f64);

    match decision {
        Ok(Decision::Allowed {
            remaining,
            reset_at,
        }) => {
            ALLOWED_TOTAL.inc();
            let mut response = next.run(req).await;
            attach_quota_headers(response.headers_mut(), &config, remaining, reset_at);
            response
        }
        Ok(Decision::Blocked {
            retry_after,
            total_blocks,
        }) => {
            BLOCKED_TOTAL.inc();
            warn!(key = %rate_key, ip = %ip, path = %path, retry_after, "rate limit blocked request");
            let body = Json(serde_json::json!({
                "status": "ERROR",
                "message": "Too many requests, please try again later.",
                "retryAfter": retry_after,
                "totalBlocks": total_blocks,
            }));
            let mut response = (StatusCode::TOO_MANY_REQUESTS, body).into_response();
            attach_quota_headers(response.headers_mut(), &config, 0, now + config.window());
            response
        }
        Err(err) => {
            // Fail closed: a broken limiter rejects rather than waving
            // requests through unthrottled
            error!(key = %rate_key, path = %path, error = %err, "rate limit check failed");
            let body = Json(serde_json::json!({
                "status": "ERROR",
                "message": "An unexpected error occurred",
            }));
            (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
        }
    }
}

// Quota headers go on every response, blocked or not
fn attach_quota_headers(
    headers: &mut HeaderMap,
    config: &RateLimitConfig,
    remaining: u32,
    reset_at: DateTime<Utc>,
) {
    headers.insert("x-ratelimit-limit", HeaderValue::from(config.points));
    headers.insert("x-ratelimit-remaining", HeaderValue::from(remaining));
    headers.insert(
        "x-ratelimit-reset",
        HeaderValue::from(reset_at.timestamp_millis()),
    );
}
