//! Finnhub market data provider implementation.
//!
//! This module provides:
//! - Latest equity quotes via the /quote endpoint (primary quote source)
//! - The market-wide earnings calendar via /calendar/earnings
//!
//! Finnhub free tier is limited to 60 API calls per minute. Only quote calls
//! are metered by the provider's bucket; the calendar is fetched at most once
//! a day per symbol thanks to the earnings cache.
//! API documentation: https://finnhub.io/docs/api

mod models;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use log::{debug, warn};
use rust_decimal::Decimal;

use crate::constants::DEFAULT_REQUEST_TIMEOUT;
use crate::errors::MarketDataError;
use crate::http::{HttpRequest, HttpTransport};
use crate::limiter::RateLimiter;
use crate::models::{EarningsCalendarEntry, EarningsSource, Quote, QuoteSource, Symbol};
use crate::provider::{acquire_token, decode, send_request, EarningsCalendarProvider, QuoteProvider};

use models::{EarningsCalendarItem, EarningsCalendarResponse, QuoteResponse};

pub const DEFAULT_BASE_URL: &str = "https://finnhub.io/api/v1";
pub const PROVIDER_ID: &str = "finnhub";

const TOKEN_PARAM: &str = "token";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Finnhub market data provider.
pub struct FinnhubProvider {
    transport: Arc<dyn HttpTransport>,
    limiter: Arc<RateLimiter>,
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl FinnhubProvider {
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

    fn request(&self, endpoint: &str) -> HttpRequest {
        HttpRequest::get(format!("{}{}", self.base_url, endpoint)).with_timeout(self.timeout)
    }

    /// Send the request with the API key attached.
    async fn send(&self, request: HttpRequest) -> Result<String, MarketDataError> {
        let request = request.with_query(TOKEN_PARAM, self.api_key.as_str());
        send_request(self.transport.as_ref(), PROVIDER_ID, request, &[TOKEN_PARAM]).await
    }
}

#[async_trait]
impl QuoteProvider for FinnhubProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn get_latest_quote(&self, symbol: &Symbol) -> Result<Quote, MarketDataError> {
        acquire_token(&self.limiter, PROVIDER_ID)?;

        let request = self.request("/quote").with_query("symbol", symbol.as_str());
        let body = self.send(request).await?;
        let response: QuoteResponse = decode(PROVIDER_ID, &body)?;

        normalize_quote(symbol, response)
    }
}

#[async_trait]
impl EarningsCalendarProvider for FinnhubProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn source(&self) -> EarningsSource {
        EarningsSource::Finnhub
    }

    async fn get_earnings_calendar(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<EarningsCalendarEntry>, MarketDataError> {
        let request = self
            .request("/calendar/earnings")
            .with_query("from", from.format(DATE_FORMAT).to_string())
            .with_query("to", to.format(DATE_FORMAT).to_string());
        let body = self.send(request).await?;
        let response: EarningsCalendarResponse = decode(PROVIDER_ID, &body)?;

        debug!(
            "Finnhub earnings calendar {}..{}: {} entries",
            from,
            to,
            response.earnings_calendar.len()
        );

        Ok(normalize_calendar(response.earnings_calendar))
    }
}

fn normalize_quote(symbol: &Symbol, response: QuoteResponse) -> Result<Quote, MarketDataError> {
    if [response.c, response.h, response.l, response.o]
        .iter()
        .all(|v| *v == 0.0)
    {
        return Err(MarketDataError::InvalidSymbol(symbol.to_string()));
    }

    let timestamp = response
        .t
        .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
        .unwrap_or_else(Utc::now);

    Ok(Quote {
        symbol: symbol.to_string(),
        price: to_decimal(response.c, "c")?,
        open: to_decimal(response.o, "o")?,
        high: to_decimal(response.h, "h")?,
        low: to_decimal(response.l, "l")?,
        prev_close: to_decimal(response.pc, "pc")?,
        // /quote does not report volume
        volume: 0,
        timestamp,
        source: QuoteSource::Finnhub,
    })
}

fn to_decimal(value: f64, field: &str) -> Result<Decimal, MarketDataError> {
    Decimal::try_from(value).map_err(|_| {
        MarketDataError::malformed(PROVIDER_ID, format!("invalid {} value: {}", field, value))
    })
}

/// Convert calendar rows, dropping any with an unreadable date.
fn normalize_calendar(items: Vec<EarningsCalendarItem>) -> Vec<EarningsCalendarEntry> {
    items
        .into_iter()
        .filter_map(|item| match NaiveDate::parse_from_str(&item.date, DATE_FORMAT) {
            Ok(date) => Some(EarningsCalendarEntry {
                symbol: item.symbol,
                date,
                hour: item.hour,
                eps_estimate: item.eps_estimate,
                revenue_estimate: item.revenue_estimate,
            }),
            Err(_) => {
                warn!(
                    "Skipping earnings entry for {} with invalid date '{}'",
                    item.symbol, item.date
                );
                None
            }
        })
        .collect()
}
