//! Market data provider abstractions and implementations.
//!
//! This module contains:
//! - The [`QuoteProvider`] and [`EarningsCalendarProvider`] traits
//! - Finnhub (primary quotes, earnings calendar)
//! - Alpha Vantage (fallback quotes)
//!
//! Each provider consumes a token from its own [`RateLimiter`] before any
//! network call, sends the request through an [`HttpTransport`] and maps the
//! outcome onto [`MarketDataError`].

mod traits;

pub mod alpha_vantage;
pub mod finnhub;

pub use traits::{EarningsCalendarProvider, QuoteProvider};

use log::debug;
use serde::de::DeserializeOwned;

use crate::constants::DEFAULT_PROVIDER_RETRY_AFTER;
use crate::errors::MarketDataError;
use crate::http::{HttpRequest, HttpTransport};
use crate::limiter::RateLimiter;

/// Take one token from the provider's bucket or fail with a wait hint.
pub(crate) fn acquire_token(limiter: &RateLimiter, provider: &str) -> Result<(), MarketDataError> {
    if limiter.consume_token(provider) {
        Ok(())
    } else {
        Err(MarketDataError::rate_limited(
            provider,
            Some(limiter.time_until_available(provider)),
        ))
    }
}

/// Send `request` and return the body of a successful response.
///
/// Query values named in `secret_params` are masked in logs. A 429 carries the
/// server's `Retry-After`, or [`DEFAULT_PROVIDER_RETRY_AFTER`] when absent.
pub(crate) async fn send_request(
    transport: &dyn HttpTransport,
    provider: &str,
    request: HttpRequest,
    secret_params: &[&str],
) -> Result<String, MarketDataError> {
    let timeout_ms = request.timeout.as_millis() as u64;
    debug!("{} request: {}", provider, request.redacted(secret_params));

    let response = transport.get(request).await.map_err(|e| {
        if e.is_timeout() {
            MarketDataError::Timeout {
                provider: provider.to_string(),
                timeout_ms,
            }
        } else {
            MarketDataError::Network {
                provider: provider.to_string(),
                message: e.message().to_string(),
            }
        }
    })?;

    if response.status == 429 {
        let wait = response.retry_after.unwrap_or(DEFAULT_PROVIDER_RETRY_AFTER);
        return Err(MarketDataError::rate_limited(provider, Some(wait)));
    }

    if !response.is_success() {
        return Err(MarketDataError::ProviderError {
            provider: provider.to_string(),
            status: response.status,
            message: response.status_text().to_string(),
        });
    }

    Ok(response.body)
}

/// Decode a JSON body into the provider's wire shape.
pub(crate) fn decode<T: DeserializeOwned>(provider: &str, body: &str) -> Result<T, MarketDataError> {
    serde_json::from_str(body).map_err(|e| MarketDataError::malformed(provider, e.to_string()))
}


#[cfg(test)]
mod tests {
    use super::test_support::MockTransport;
    use super::*;
    use std::time::Duration;

    use crate::http::{HttpError, HttpResponse};
    use crate::limiter::RateLimitConfig;

    #[test]
    fn test_acquire_token_reports_wait() {
        let limiter = RateLimiter::new(RateLimitConfig::new(5, 1));
        assert!(acquire_token(&limiter, "alphavantage").is_ok());

        let err = acquire_token(&limiter, "alphavantage").unwrap_err();
        assert!(matches!(err, MarketDataError::RateLimited { .. }));
        assert_eq!(err.retry_after(), Some(std::time::Duration::from_secs(12)));
    }

    #[tokio::test]
    async fn test_send_request_maps_failures() {
        let transport = MockTransport::new()
            .fail(HttpError::timeout("deadline"))
            .fail(HttpError::new("connection refused"))
            .respond(429, "")
            .respond(503, "")
            .respond(200, "{}");

        let request = || HttpRequest::get("https://example.test/quote");

        let err = send_request(&transport, "finnhub", request(), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, MarketDataError::Timeout { timeout_ms: 10_000, .. }));

        let err = send_request(&transport, "finnhub", request(), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, MarketDataError::Network { .. }));

        let err = send_request(&transport, "finnhub", request(), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, MarketDataError::RateLimited { .. }));

        let err = send_request(&transport, "finnhub", request(), &[])
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "finnhub API error: 503 Service Unavailable");

        let body = send_request(&transport, "finnhub", request(), &[])
            .await
            .unwrap();
        assert_eq!(body, "{}");
    }

    #[tokio::test]
    async fn test_provider_429_carries_wait_hint() {
        let transport = MockTransport::new()
            .respond(429, "")
            .respond_with(HttpResponse::new(429, "").with_retry_after(Duration::from_secs(17)));
        let request = || HttpRequest::get("https://example.test/quote");

        let err = send_request(&transport, "finnhub", request(), &[])
            .await
            .unwrap_err();
        assert_eq!(err.retry_after(), Some(DEFAULT_PROVIDER_RETRY_AFTER));

        let err = send_request(&transport, "finnhub", request(), &[])
            .await
            .unwrap_err();
        assert_eq!(err.retry_after(), Some(Duration::from_secs(17)));
    }

    #[test]
    fn test_decode_failure_is_malformed() {
        let err = decode::<serde_json::Value>("finnhub", "not json").unwrap_err();
        assert!(matches!(err, MarketDataError::MalformedResponse { .. }));
    }
}
