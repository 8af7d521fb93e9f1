use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, HeaderName, HeaderValue, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{error::ApiError, main_lib::AppState};

pub const RATE_LIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
pub const RATE_LIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");

const UNKNOWN_CLIENT: &str = "unknown";

/// Identity used as the rate limit key.
///
/// First `x-forwarded-for` entry, then `x-real-ip`, then `x-connecting-ip`.
/// Clients with none of these share the `"unknown"` bucket.
pub fn client_key(headers: &HeaderMap) -> String {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
    };

    if let Some(forwarded) = header("x-forwarded-for") {
        if let Some(first) = forwarded.split(',').map(str::trim).find(|ip| !ip.is_empty()) {
            return first.to_string();
        }
    }

    header("x-real-ip")
        .or_else(|| header("x-connecting-ip"))
        .unwrap_or(UNKNOWN_CLIENT)
        .to_string()
}

/// Spend one client token per request, or answer 429 without calling the handler.
pub async fn enforce_client_limit(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let limiter = &state.client_limiter;
    let key = client_key(request.headers());
    let limit = limiter.config().burst_capacity;

    let mut response = if limiter.consume_token(&key) {
        next.run(request).await
    } else {
        tracing::warn!("Client rate limit exceeded for {}", key);
        ApiError::TooManyRequests {
            retry_after: Some(limiter.time_until_available(&key)),
        }
        .into_response()
    };

    let remaining = limiter.remaining_tokens(&key).floor().max(0.0) as u64;
    let headers = response.headers_mut();
    headers.insert(RATE_LIMIT_LIMIT, HeaderValue::from(limit));
    headers.insert(RATE_LIMIT_REMAINING, HeaderValue::from(remaining));
    response
}
