//! Error types and transport classification for the market data crate.
//!
//! This module provides:
//! - [`MarketDataError`]: The error enum returned by every provider and service call
//! - [`ErrorKind`]: The provider-agnostic class a transport layer maps to a status code

use std::time::Duration;

use thiserror::Error;

/// Provider-agnostic classification of a [`MarketDataError`].
///
/// | Kind | HTTP equivalent |
/// |------|-----------------|
/// | `InvalidInput` | 400 |
/// | `ProviderRateLimited` | 429 |
/// | `ProviderError` | 500 |
/// | `NotFound` | 404 |
/// | `Timeout` | 500 |
/// | `Unknown` | 500 |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    InvalidInput,
    ProviderRateLimited,
    ProviderError,
    NotFound,
    Timeout,
    Unknown,
}

/// Errors that can occur during quote and earnings retrieval.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// The caller supplied a malformed symbol.
    #[error("Invalid symbol: {0}")]
    InvalidInput(String),

    /// The local token bucket for the provider is empty, or the provider
    /// reported that its own quota is exhausted.
    #[error("{provider} rate limit exceeded")]
    RateLimited {
        /// The provider whose budget is spent
        provider: String,
        /// Estimated wait before a new request would be admitted, when known
        retry_after: Option<Duration>,
    },

    /// The provider answered with a non-success HTTP status.
    #[error("{provider} API error: {status} {message}")]
    ProviderError {
        /// The provider that returned the error
        provider: String,
        /// HTTP status code
        status: u16,
        /// Status reason or error text from the body
        message: String,
    },

    /// The provider answered successfully but knows nothing about the symbol.
    #[error("Invalid symbol or no data available: {0}")]
    InvalidSymbol(String),

    /// The calendar has no entry on or after today for the symbol.
    #[error("No upcoming earnings date found for {0}")]
    NoUpcomingEarnings(String),

    /// The provider returned an empty earnings calendar.
    #[error("No earnings calendar data available")]
    NoCalendarData,

    /// The request exceeded its time bound.
    #[error("{provider} request timeout after {timeout_ms}ms")]
    Timeout {
        /// The provider that timed out
        provider: String,
        /// The bound that was exceeded
        timeout_ms: u64,
    },

    /// Connection-level failure before any status was received.
    #[error("{provider} request failed: {message}")]
    Network {
        /// The provider being contacted
        provider: String,
        /// Transport error text
        message: String,
    },

    /// The body could not be decoded into the provider's shape.
    #[error("{provider} returned an unreadable response: {message}")]
    MalformedResponse {
        /// The provider that sent the body
        provider: String,
        /// Decoder error text
        message: String,
    },

    /// Both quote providers failed. Carries the primary provider's error;
    /// the fallback's error is only logged.
    #[error("Failed to fetch quote for {symbol}: {primary}")]
    QuoteUnavailable {
        /// Normalized symbol
        symbol: String,
        /// The primary provider's failure
        #[source]
        primary: Box<MarketDataError>,
    },

    /// Any other internal failure.
    #[error("{0}")]
    Unknown(String),
}

impl MarketDataError {
    /// Returns the provider-agnostic class of this error.
    ///
    /// A [`QuoteUnavailable`](Self::QuoteUnavailable) error is classified by
    /// the primary provider's failure it wraps.
    ///
    /// # Examples
    ///
    /// ```
    /// use folio_market_data::errors::{ErrorKind, MarketDataError};
    ///
    /// let error = MarketDataError::InvalidSymbol("ZZZZ".to_string());
    /// assert_eq!(error.kind(), ErrorKind::NotFound);
    /// assert_eq!(error.status_code(), 404);
    /// ```
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::RateLimited { .. } => ErrorKind::ProviderRateLimited,
            Self::ProviderError { .. } => ErrorKind::ProviderError,
            Self::InvalidSymbol(_) | Self::NoUpcomingEarnings(_) | Self::NoCalendarData => {
                ErrorKind::NotFound
            }
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Network { .. } | Self::MalformedResponse { .. } | Self::Unknown(_) => {
                ErrorKind::Unknown
            }
            Self::QuoteUnavailable { primary, .. } => primary.kind(),
        }
    }

    /// HTTP status a transport layer should answer with.
    pub fn status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::InvalidInput => 400,
            ErrorKind::ProviderRateLimited => 429,
            ErrorKind::NotFound => 404,
            ErrorKind::ProviderError | ErrorKind::Timeout | ErrorKind::Unknown => 500,
        }
    }

    /// Wait hint attached to a rate-limit failure, if any.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after, .. } => *retry_after,
            Self::QuoteUnavailable { primary, .. } => primary.retry_after(),
            _ => None,
        }
    }

    pub(crate) fn rate_limited(provider: &str, retry_after: Option<Duration>) -> Self {
        Self::RateLimited {
            provider: provider.to_string(),
            retry_after,
        }
    }

    pub(crate) fn malformed(provider: &str, message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            provider: provider.to_string(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_is_bad_request() {
        let error = MarketDataError::InvalidInput("Symbol is required".to_string());
        assert_eq!(error.kind(), ErrorKind::InvalidInput);
        assert_eq!(error.status_code(), 400);
    }

    #[test]
    fn test_rate_limited_is_too_many_requests() {
        let error = MarketDataError::rate_limited("finnhub", Some(Duration::from_secs(1)));
        assert_eq!(error.kind(), ErrorKind::ProviderRateLimited);
        assert_eq!(error.status_code(), 429);
        assert_eq!(error.retry_after(), Some(Duration::from_secs(1)));
    }

    #[test]
    fn test_no_data_variants_are_not_found() {
        for error in [
            MarketDataError::InvalidSymbol("ZZZZ".to_string()),
            MarketDataError::NoUpcomingEarnings("AAPL".to_string()),
            MarketDataError::NoCalendarData,
        ] {
            assert_eq!(error.kind(), ErrorKind::NotFound);
            assert_eq!(error.status_code(), 404);
        }
    }

    #[test]
    fn test_transport_failures_are_server_errors() {
        let timeout = MarketDataError::Timeout {
            provider: "finnhub".to_string(),
            timeout_ms: 10_000,
        };
        assert_eq!(timeout.kind(), ErrorKind::Timeout);
        assert_eq!(timeout.status_code(), 500);

        let malformed = MarketDataError::malformed("alphavantage", "expected value");
        assert_eq!(malformed.kind(), ErrorKind::Unknown);
        assert_eq!(malformed.status_code(), 500);
    }

    #[test]
    fn test_quote_unavailable_takes_primary_classification() {
        let error = MarketDataError::QuoteUnavailable {
            symbol: "AAPL".to_string(),
            primary: Box::new(MarketDataError::rate_limited(
                "finnhub",
                Some(Duration::from_secs(2)),
            )),
        };
        assert_eq!(error.kind(), ErrorKind::ProviderRateLimited);
        assert_eq!(error.status_code(), 429);
        assert_eq!(error.retry_after(), Some(Duration::from_secs(2)));
    }

    #[test]
    fn test_error_display() {
        let error = MarketDataError::ProviderError {
            provider: "finnhub".to_string(),
            status: 503,
            message: "Service Unavailable".to_string(),
        };
        assert_eq!(
            format!("{}", error),
            "finnhub API error: 503 Service Unavailable"
        );

        let error = MarketDataError::QuoteUnavailable {
            symbol: "AAPL".to_string(),
            primary: Box::new(MarketDataError::InvalidSymbol("AAPL".to_string())),
        };
        assert_eq!(
            format!("{}", error),
            "Failed to fetch quote for AAPL: Invalid symbol or no data available: AAPL"
        );

        let error = MarketDataError::Timeout {
            provider: "alphavantage".to_string(),
            timeout_ms: 10_000,
        };
        assert_eq!(
            format!("{}", error),
            "alphavantage request timeout after 10000ms"
        );
    }
}
