//! Provider trait definitions.
//!
//! Services talk to providers only through these traits, so a provider can be
//! swapped or mocked without touching orchestration code.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::MarketDataError;
use crate::models::{EarningsCalendarEntry, EarningsSource, Quote, Symbol};

/// Source of latest quotes for a single symbol.
///
/// Implementations own their rate limit: a call that finds the provider's
/// bucket empty fails with [`MarketDataError::RateLimited`] without touching
/// the network.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Short lowercase identifier used in logs and errors.
    fn id(&self) -> &'static str;

    /// Fetch and normalize the latest quote.
    ///
    /// A response in which price, open, high and low are all zero is reported
    /// as [`MarketDataError::InvalidSymbol`].
    async fn get_latest_quote(&self, symbol: &Symbol) -> Result<Quote, MarketDataError>;
}

/// Source of the market-wide earnings calendar.
#[async_trait]
pub trait EarningsCalendarProvider: Send + Sync {
    fn id(&self) -> &'static str;

    /// Tag stamped on records built from this provider's calendar.
    fn source(&self) -> EarningsSource;

    /// All scheduled reports between `from` and `to`, both inclusive, in
    /// provider order.
    async fn get_earnings_calendar(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<EarningsCalendarEntry>, MarketDataError>;
}
