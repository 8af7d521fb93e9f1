//! Tests for QuoteService and EarningsService orchestration.
//!
//! # Contract Points
//!
//! 1. Cache first: a fresh hit never reaches a provider
//! 2. Fallback: any primary failure is retried once against the fallback
//! 3. Double failure: the primary's error is surfaced, the fallback's is dropped
//! 4. Blank quotes are rejected and never cached
//! 5. Earnings: earliest calendar date on or after today wins

#[cfg(test)]
mod tests {
    use crate::errors::{ErrorKind, MarketDataError};
    use crate::models::{
        EarningsCalendarEntry, EarningsHour, EarningsSource, Quote, QuoteSource, Symbol,
    };
    use crate::provider::{EarningsCalendarProvider, QuoteProvider};
    use crate::service::{EarningsService, QuoteService};
    use async_trait::async_trait;
    use chrono::{NaiveDate, TimeZone, Utc};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    const TTL: Duration = Duration::from_secs(60);

    // =========================================================================
    // Mock QuoteProvider
    // =========================================================================

    type QuoteOutcome = Box<dyn Fn(&Symbol) -> Result<Quote, MarketDataError> + Send + Sync>;

    struct MockQuoteProvider {
        id: &'static str,
        call_count: AtomicUsize,
        outcome: QuoteOutcome,
    }

    impl MockQuoteProvider {
        fn new(
            id: &'static str,
            outcome: impl Fn(&Symbol) -> Result<Quote, MarketDataError> + Send + Sync + 'static,
        ) -> Arc<Self> {
            Arc::new(Self {
                id,
                call_count: AtomicUsize::new(0),
                outcome: Box::new(outcome),
            })
        }

        fn calls(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl QuoteProvider for MockQuoteProvider {
        fn id(&self) -> &'static str {
            self.id
        }

        async fn get_latest_quote(&self, symbol: &Symbol) -> Result<Quote, MarketDataError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            (self.outcome)(symbol)
        }
    }

    fn quote(symbol: &Symbol, price: Decimal, source: QuoteSource) -> Quote {
        Quote {
            symbol: symbol.to_string(),
            price,
            open: price,
            high: price,
            low: price,
            prev_close: price,
            volume: 0,
            timestamp: Utc.timestamp_opt(1_704_067_200, 0).unwrap(),
            source,
        }
    }

    fn provider_error(provider: &str, status: u16) -> MarketDataError {
        MarketDataError::ProviderError {
            provider: provider.to_string(),
            status,
            message: "Service Unavailable".to_string(),
        }
    }

    fn finnhub_ok() -> Arc<MockQuoteProvider> {
        MockQuoteProvider::new("finnhub", |s| {
            Ok(quote(s, dec!(150.00), QuoteSource::Finnhub))
        })
    }

    fn alpha_ok() -> Arc<MockQuoteProvider> {
        MockQuoteProvider::new("alphavantage", |s| {
            Ok(quote(s, dec!(149.50), QuoteSource::AlphaVantage))
        })
    }

    fn alpha_down() -> Arc<MockQuoteProvider> {
        MockQuoteProvider::new("alphavantage", |_| Err(provider_error("alphavantage", 503)))
    }

    // =========================================================================
    // QuoteService
    // =========================================================================

    #[tokio::test]
    async fn test_primary_quote_is_cached() {
        let primary = finnhub_ok();
        let fallback = alpha_ok();
        let service = QuoteService::new(primary.clone(), fallback.clone(), TTL);

        let first = service.get_quote("AAPL").await.unwrap();
        assert_eq!(first.price, dec!(150.00));
        assert_eq!(first.source, QuoteSource::Finnhub);

        let second = service.get_quote("AAPL").await.unwrap();
        assert_eq!(second, first);
        assert_eq!(primary.calls(), 1);
        assert_eq!(fallback.calls(), 0);
    }

    #[tokio::test]
    async fn test_symbol_case_shares_cache_entry() {
        let primary = finnhub_ok();
        let service = QuoteService::new(primary.clone(), alpha_ok(), TTL);

        let lower = service.get_quote(" aapl").await.unwrap();
        let upper = service.get_quote("AAPL").await.unwrap();

        assert_eq!(lower.symbol, "AAPL");
        assert_eq!(lower, upper);
        assert_eq!(primary.calls(), 1);
    }

    #[tokio::test]
    async fn test_fallback_masks_primary_failure() {
        let primary = MockQuoteProvider::new("finnhub", |_| Err(provider_error("finnhub", 503)));
        let fallback = alpha_ok();
        let service = QuoteService::new(primary.clone(), fallback.clone(), TTL);

        let result = service.get_quote("MSFT").await.unwrap();
        assert_eq!(result.source, QuoteSource::AlphaVantage);
        assert_eq!(result.price, dec!(149.50));

        // Fallback result is cached too
        service.get_quote("MSFT").await.unwrap();
        assert_eq!(primary.calls(), 1);
        assert_eq!(fallback.calls(), 1);
    }

    #[tokio::test]
    async fn test_double_failure_surfaces_primary_error() {
        let primary = MockQuoteProvider::new("finnhub", |_| {
            Err(MarketDataError::RateLimited {
                provider: "finnhub".to_string(),
                retry_after: Some(Duration::from_secs(1)),
            })
        });
        let service = QuoteService::new(primary, alpha_down(), TTL);

        let err = service.get_quote("AAPL").await.unwrap_err();

        match &err {
            MarketDataError::QuoteUnavailable { symbol, primary } => {
                assert_eq!(symbol, "AAPL");
                assert!(matches!(**primary, MarketDataError::RateLimited { .. }));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.kind(), ErrorKind::ProviderRateLimited);
        assert_eq!(err.status_code(), 429);
        assert_eq!(err.retry_after(), Some(Duration::from_secs(1)));
        assert!(err.to_string().contains("finnhub rate limit exceeded"));
        assert!(!err.to_string().contains("alphavantage"));
    }

    #[tokio::test]
    async fn test_blank_quote_rejected_and_not_cached() {
        let primary = MockQuoteProvider::new("finnhub", |s| {
            Ok(quote(s, Decimal::ZERO, QuoteSource::Finnhub))
        });
        let service = QuoteService::new(primary.clone(), alpha_down(), TTL);

        let err = service.get_quote("ZZZZ").await.unwrap_err();
        match &err {
            MarketDataError::QuoteUnavailable { primary, .. } => {
                assert!(matches!(**primary, MarketDataError::InvalidSymbol(ref s) if s == "ZZZZ"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.status_code(), 404);

        service.get_quote("ZZZZ").await.unwrap_err();
        assert_eq!(primary.calls(), 2);
    }

    #[tokio::test]
    async fn test_invalid_symbol_never_reaches_providers() {
        let primary = finnhub_ok();
        let fallback = alpha_ok();
        let service = QuoteService::new(primary.clone(), fallback.clone(), TTL);

        for raw in ["", "TOOLONGSYM", "AA$"] {
            let err = service.get_quote(raw).await.unwrap_err();
            assert!(matches!(err, MarketDataError::InvalidInput(_)));
        }
        assert_eq!(primary.calls(), 0);
        assert_eq!(fallback.calls(), 0);
    }

    #[tokio::test]
    async fn test_clear_cache_forces_refetch() {
        let primary = finnhub_ok();
        let service = QuoteService::new(primary.clone(), alpha_ok(), TTL);

        service.get_quote("AAPL").await.unwrap();
        service.clear_cache();
        service.get_quote("AAPL").await.unwrap();
        assert_eq!(primary.calls(), 2);
    }

    // =========================================================================
    // Mock EarningsCalendarProvider
    // =========================================================================

    struct MockCalendar {
        entries: Vec<EarningsCalendarEntry>,
        fail: bool,
        call_count: AtomicUsize,
        windows: Mutex<Vec<(NaiveDate, NaiveDate)>>,
    }

    impl MockCalendar {
        fn with_entries(entries: Vec<EarningsCalendarEntry>) -> Arc<Self> {
            Arc::new(Self {
                entries,
                fail: false,
                call_count: AtomicUsize::new(0),
                windows: Mutex::new(Vec::new()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                entries: Vec::new(),
                fail: true,
                call_count: AtomicUsize::new(0),
                windows: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl EarningsCalendarProvider for MockCalendar {
        fn id(&self) -> &'static str {
            "finnhub"
        }

        fn source(&self) -> EarningsSource {
            EarningsSource::Finnhub
        }

        async fn get_earnings_calendar(
            &self,
            from: NaiveDate,
            to: NaiveDate,
        ) -> Result<Vec<EarningsCalendarEntry>, MarketDataError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            self.windows.lock().unwrap().push((from, to));
            if self.fail {
                return Err(provider_error("finnhub", 502));
            }
            Ok(self.entries.clone())
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn entry(symbol: &str, date: NaiveDate, hour: &str) -> EarningsCalendarEntry {
        EarningsCalendarEntry {
            symbol: symbol.to_string(),
            date,
            hour: Some(hour.to_string()),
            eps_estimate: None,
            revenue_estimate: None,
        }
    }

    fn earnings_service(calendar: Arc<MockCalendar>) -> EarningsService {
        EarningsService::new(calendar, Duration::from_secs(86_400), 90)
    }

    fn sym(raw: &str) -> Symbol {
        Symbol::parse(raw).unwrap()
    }

    // =========================================================================
    // EarningsService
    // =========================================================================

    #[tokio::test]
    async fn test_earliest_upcoming_date_wins() {
        let today = day(2026, 10, 19);
        let calendar = MockCalendar::with_entries(vec![
            entry("AAPL", day(2027, 1, 28), "amc"),
            entry("MSFT", day(2026, 10, 21), "amc"),
            entry("AAPL", day(2026, 10, 2), "amc"),
            entry("aapl", day(2026, 10, 29), "bmo"),
        ]);
        let service = earnings_service(calendar.clone());

        let record = service.earnings_date_on(&sym("AAPL"), today).await.unwrap();

        assert_eq!(record.symbol, "AAPL");
        assert_eq!(record.earnings_date, day(2026, 10, 29));
        assert_eq!(record.hour, Some(EarningsHour::Bmo));
        assert_eq!(record.source, EarningsSource::Finnhub);

        let windows = calendar.windows.lock().unwrap().clone();
        assert_eq!(windows, vec![(today, day(2027, 1, 17))]);
    }

    #[tokio::test]
    async fn test_today_counts_as_upcoming() {
        let today = day(2026, 10, 19);
        let calendar = MockCalendar::with_entries(vec![entry("NVDA", today, "")]);
        let service = earnings_service(calendar);

        let record = service.earnings_date_on(&sym("nvda"), today).await.unwrap();
        assert_eq!(record.earnings_date, today);
        assert_eq!(record.hour, None);
    }

    #[tokio::test]
    async fn test_only_past_dates_is_no_upcoming() {
        let today = day(2026, 10, 19);
        let calendar = MockCalendar::with_entries(vec![
            entry("AAPL", day(2026, 7, 30), "amc"),
            entry("MSFT", day(2026, 10, 21), "amc"),
        ]);
        let service = earnings_service(calendar);

        let err = service.earnings_date_on(&sym("AAPL"), today).await.unwrap_err();
        assert!(matches!(err, MarketDataError::NoUpcomingEarnings(ref s) if s == "AAPL"));
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn test_empty_calendar_is_no_calendar_data() {
        let service = earnings_service(MockCalendar::with_entries(Vec::new()));

        let err = service
            .earnings_date_on(&sym("AAPL"), day(2026, 10, 19))
            .await
            .unwrap_err();
        assert!(matches!(err, MarketDataError::NoCalendarData));
    }

    #[tokio::test]
    async fn test_earnings_record_is_cached() {
        let today = day(2026, 10, 19);
        let calendar = MockCalendar::with_entries(vec![entry("AAPL", day(2026, 10, 29), "amc")]);
        let service = earnings_service(calendar.clone());

        service.earnings_date_on(&sym("AAPL"), today).await.unwrap();
        let cached = service.earnings_date_on(&sym("aapl"), today).await.unwrap();

        assert_eq!(cached.hour, Some(EarningsHour::Amc));
        assert_eq!(calendar.calls(), 1);
    }

    #[tokio::test]
    async fn test_earnings_failure_not_cached() {
        let calendar = MockCalendar::failing();
        let service = earnings_service(calendar.clone());
        let today = day(2026, 10, 19);

        let err = service.earnings_date_on(&sym("AAPL"), today).await.unwrap_err();
        assert!(matches!(err, MarketDataError::ProviderError { status: 502, .. }));

        service.earnings_date_on(&sym("AAPL"), today).await.unwrap_err();
        assert_eq!(calendar.calls(), 2);
    }

    #[tokio::test]
    async fn test_earnings_rejects_invalid_symbol() {
        let calendar = MockCalendar::with_entries(Vec::new());
        let service = earnings_service(calendar.clone());

        let err = service.get_earnings_date("BAD SYM").await.unwrap_err();
        assert!(matches!(err, MarketDataError::InvalidInput(_)));
        assert_eq!(calendar.calls(), 0);
    }
}
