use std::sync::Arc;
use std::time::Duration;

use chrono::{Days, NaiveDate, Utc};
use log::{debug, warn};

use crate::cache::TtlCache;
use crate::errors::MarketDataError;
use crate::models::{EarningsCalendarEntry, EarningsHour, EarningsRecord, EarningsSource, Symbol};
use crate::provider::EarningsCalendarProvider;

/// Next earnings date per symbol, searched in the provider's calendar.
///
/// The calendar window runs from today (UTC) to today plus the look-ahead.
/// There is no fallback provider; failures are returned as-is.
pub struct EarningsService {
    provider: Arc<dyn EarningsCalendarProvider>,
    cache: TtlCache<EarningsRecord>,
    lookahead_days: u64,
}

impl EarningsService {
    pub fn new(
        provider: Arc<dyn EarningsCalendarProvider>,
        cache_ttl: Duration,
        lookahead_days: u64,
    ) -> Self {
        Self {
            provider,
            cache: TtlCache::new(cache_ttl),
            lookahead_days,
        }
    }

    /// Normalize `raw_symbol` and return its next scheduled report.
    pub async fn get_earnings_date(&self, raw_symbol: &str) -> Result<EarningsRecord, MarketDataError> {
        let symbol = Symbol::parse(raw_symbol)?;
        self.get_earnings_date_for(&symbol).await
    }

    pub async fn get_earnings_date_for(
        &self,
        symbol: &Symbol,
    ) -> Result<EarningsRecord, MarketDataError> {
        self.earnings_date_on(symbol, Utc::now().date_naive()).await
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub(crate) async fn earnings_date_on(
        &self,
        symbol: &Symbol,
        today: NaiveDate,
    ) -> Result<EarningsRecord, MarketDataError> {
        if let Some(record) = self.cache.get(symbol.as_str()) {
            debug!("Earnings cache hit for {}", symbol);
            return Ok(record);
        }

        let to = today
            .checked_add_days(Days::new(self.lookahead_days))
            .unwrap_or(NaiveDate::MAX);

        let record = self
            .provider
            .get_earnings_calendar(today, to)
            .await
            .and_then(|calendar| next_earnings(calendar, symbol, today, self.provider.source()))
            .inspect_err(|e| {
                warn!(
                    "{} earnings lookup failed for {}: {}",
                    self.provider.id(),
                    symbol,
                    e
                )
            })?;

        self.cache.set(symbol.as_str(), record.clone());
        Ok(record)
    }
}

/// Earliest calendar entry for `symbol` dated today or later.
fn next_earnings(
    calendar: Vec<EarningsCalendarEntry>,
    symbol: &Symbol,
    today: NaiveDate,
    source: EarningsSource,
) -> Result<EarningsRecord, MarketDataError> {
    if calendar.is_empty() {
        return Err(MarketDataError::NoCalendarData);
    }

    let mut matching: Vec<EarningsCalendarEntry> = calendar
        .into_iter()
        .filter(|entry| entry.symbol.eq_ignore_ascii_case(symbol.as_str()))
        .collect();
    matching.sort_by_key(|entry| entry.date);

    let next = matching
        .into_iter()
        .find(|entry| entry.date >= today)
        .ok_or_else(|| MarketDataError::NoUpcomingEarnings(symbol.to_string()))?;

    Ok(EarningsRecord {
        symbol: symbol.to_string(),
        earnings_date: next.date,
        hour: next.hour.as_deref().and_then(EarningsHour::from_provider_text),
        source,
    })
}
