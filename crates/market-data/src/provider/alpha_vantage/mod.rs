//! Alpha Vantage market data provider implementation.
//!
//! Used as the fallback quote source through the GLOBAL_QUOTE function.
//! Alpha Vantage reports quota and lookup problems inside a 200 response, so
//! the body is checked for `Note`, `Information` and `Error Message` before
//! the quote is read.
//!
//! Free tier is limited to 5 API calls per minute.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use log::warn;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::constants::{DEFAULT_PROVIDER_RETRY_AFTER, DEFAULT_REQUEST_TIMEOUT};
use crate::errors::MarketDataError;
use crate::http::{HttpRequest, HttpTransport};
use crate::limiter::RateLimiter;
use crate::models::{Quote, QuoteSource, Symbol};
use crate::provider::{acquire_token, decode, send_request, QuoteProvider};

pub const DEFAULT_BASE_URL: &str = "https://www.alphavantage.co";
pub const PROVIDER_ID: &str = "alphavantage";

const API_KEY_PARAM: &str = "apikey";

// ============================================================================
// API Response Structures
// ============================================================================

/// Envelope for the GLOBAL_QUOTE function.
#[derive(Debug, Deserialize)]
struct GlobalQuoteResponse {
    #[serde(rename = "Global Quote")]
    global_quote: Option<GlobalQuote>,
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
}

/// Every field arrives as a string. Unknown symbols get an empty object.
#[derive(Debug, Default, Deserialize)]
struct GlobalQuote {
    #[serde(rename = "01. symbol", default)]
    symbol: String,
    #[serde(rename = "02. open", default)]
    open: String,
    #[serde(rename = "03. high", default)]
    high: String,
    #[serde(rename = "04. low", default)]
    low: String,
    #[serde(rename = "05. price", default)]
    price: String,
    #[serde(rename = "06. volume", default)]
    volume: String,
    #[serde(rename = "07. latest trading day", default)]
    latest_trading_day: String,
    #[serde(rename = "08. previous close", default)]
    previous_close: String,
}

// ============================================================================
// AlphaVantageProvider
// ============================================================================

/// Alpha Vantage quote provider.
pub struct AlphaVantageProvider {
    transport: Arc<dyn HttpTransport>,
    limiter: Arc<RateLimiter>,
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl AlphaVantageProvider {
    pub fn new(
        api_key: impl Into<String>,
        transport: Arc<dyn HttpTransport>,
        limiter: Arc<RateLimiter>,
    ) -> Self {
        Self {
            transport,
            limiter,
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Check for API error messages carried in a successful response.
    ///
    /// Quota messages win over `Error Message` when both are present.
    fn check_api_error(symbol: &Symbol, response: &GlobalQuoteResponse) -> Result<(), MarketDataError> {
        // "Note" is only sent when the call frequency is exceeded
        if let Some(ref msg) = response.note {
            warn!("Alpha Vantage note: {}", msg);
            return Err(Self::quota_exceeded());
        }

        // "Information" covers quota messages as well as premium notices
        if let Some(ref msg) = response.information {
            let lowered = msg.to_lowercase();
            if lowered.contains("rate limit") || lowered.contains("api call frequency") {
                warn!("Alpha Vantage quota: {}", msg);
                return Err(Self::quota_exceeded());
            }
            warn!("Alpha Vantage info: {}", msg);
        }

        if let Some(ref msg) = response.error_message {
            warn!("Alpha Vantage error for {}: {}", symbol, msg);
            return Err(MarketDataError::InvalidSymbol(symbol.to_string()));
        }

        Ok(())
    }

    fn quota_exceeded() -> MarketDataError {
        MarketDataError::rate_limited(PROVIDER_ID, Some(DEFAULT_PROVIDER_RETRY_AFTER))
    }

    /// Parse a trading day in YYYY-MM-DD format to midnight UTC.
    fn parse_date(date_str: &str) -> Option<DateTime<Utc>> {
        NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .and_then(|dt| Utc.from_local_datetime(&dt).single())
    }

    fn parse_decimal(value: &str, field: &str) -> Result<Decimal, MarketDataError> {
        Decimal::from_str(value.trim()).map_err(|_| {
            MarketDataError::malformed(PROVIDER_ID, format!("invalid {}: '{}'", field, value))
        })
    }

    fn parse_volume(value: &str) -> Result<u64, MarketDataError> {
        value.trim().parse().map_err(|_| {
            MarketDataError::malformed(PROVIDER_ID, format!("invalid volume: '{}'", value))
        })
    }

    fn normalize_quote(symbol: &Symbol, quote: GlobalQuote) -> Result<Quote, MarketDataError> {
        if quote.symbol.trim().is_empty() {
            return Err(MarketDataError::InvalidSymbol(symbol.to_string()));
        }

        let timestamp = Self::parse_date(&quote.latest_trading_day).ok_or_else(|| {
            MarketDataError::malformed(
                PROVIDER_ID,
                format!("invalid latest trading day: '{}'", quote.latest_trading_day),
            )
        })?;

        Ok(Quote {
            symbol: symbol.to_string(),
            price: Self::parse_decimal(&quote.price, "price")?,
            open: Self::parse_decimal(&quote.open, "open")?,
            high: Self::parse_decimal(&quote.high, "high")?,
            low: Self::parse_decimal(&quote.low, "low")?,
            prev_close: Self::parse_decimal(&quote.previous_close, "previous close")?,
            volume: Self::parse_volume(&quote.volume)?,
            timestamp,
            source: QuoteSource::AlphaVantage,
        })
    }
}

#[async_trait]
impl QuoteProvider for AlphaVantageProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn get_latest_quote(&self, symbol: &Symbol) -> Result<Quote, MarketDataError> {
        acquire_token(&self.limiter, PROVIDER_ID)?;

        let request = HttpRequest::get(format!("{}/query", self.base_url))
            .with_timeout(self.timeout)
            .with_query("function", "GLOBAL_QUOTE")
            .with_query("symbol", symbol.as_str())
            .with_query(API_KEY_PARAM, self.api_key.as_str());
        let body = send_request(self.transport.as_ref(), PROVIDER_ID, request, &[API_KEY_PARAM]).await?;
        let response: GlobalQuoteResponse = decode(PROVIDER_ID, &body)?;

        Self::check_api_error(symbol, &response)?;

        let quote = Self::normalize_quote(symbol, response.global_quote.unwrap_or_default())?;
        if quote.is_blank() {
            return Err(MarketDataError::InvalidSymbol(symbol.to_string()));
        }
        Ok(quote)
    }
}
