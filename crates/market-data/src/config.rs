//! Settings for building the quote and earnings services.

use std::time::Duration;

use crate::constants::{
    ALPHA_VANTAGE_BURST_CAPACITY, ALPHA_VANTAGE_REQUESTS_PER_MINUTE, BUCKET_IDLE_WINDOW,
    BUCKET_SWEEP_INTERVAL, DEFAULT_EARNINGS_TTL, DEFAULT_QUOTE_TTL, DEFAULT_REQUEST_TIMEOUT,
    EARNINGS_LOOKAHEAD_DAYS, FINNHUB_BURST_CAPACITY, FINNHUB_REQUESTS_PER_MINUTE,
};
use crate::limiter::RateLimitConfig;
use crate::provider::{alpha_vantage, finnhub};

/// Provider credentials, endpoints and tuning for [`MarketDataServices`].
///
/// [`MarketDataServices`]: crate::service::MarketDataServices
#[derive(Clone)]
pub struct MarketDataConfig {
    pub finnhub_api_key: String,
    pub alpha_vantage_api_key: String,
    pub finnhub_base_url: String,
    pub alpha_vantage_base_url: String,
    pub finnhub_rate_limit: RateLimitConfig,
    pub alpha_vantage_rate_limit: RateLimitConfig,
    pub quote_ttl: Duration,
    pub earnings_ttl: Duration,
    /// Bound on each provider call
    pub request_timeout: Duration,
    pub earnings_lookahead_days: u64,
    pub sweep_interval: Duration,
    pub bucket_idle: Duration,
}

impl MarketDataConfig {
    /// Production endpoints and free-tier limits for the given keys.
    pub fn new(finnhub_api_key: impl Into<String>, alpha_vantage_api_key: impl Into<String>) -> Self {
        Self {
            finnhub_api_key: finnhub_api_key.into(),
            alpha_vantage_api_key: alpha_vantage_api_key.into(),
            finnhub_base_url: finnhub::DEFAULT_BASE_URL.to_string(),
            alpha_vantage_base_url: alpha_vantage::DEFAULT_BASE_URL.to_string(),
            finnhub_rate_limit: RateLimitConfig::new(
                FINNHUB_REQUESTS_PER_MINUTE,
                FINNHUB_BURST_CAPACITY,
            ),
            alpha_vantage_rate_limit: RateLimitConfig::new(
                ALPHA_VANTAGE_REQUESTS_PER_MINUTE,
                ALPHA_VANTAGE_BURST_CAPACITY,
            ),
            quote_ttl: DEFAULT_QUOTE_TTL,
            earnings_ttl: DEFAULT_EARNINGS_TTL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            earnings_lookahead_days: EARNINGS_LOOKAHEAD_DAYS,
            sweep_interval: BUCKET_SWEEP_INTERVAL,
            bucket_idle: BUCKET_IDLE_WINDOW,
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

// Keys stay out of debug output
impl std::fmt::Debug for MarketDataConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketDataConfig")
            .field("finnhub_api_key", &"***")
            .field("alpha_vantage_api_key", &"***")
            .field("finnhub_base_url", &self.finnhub_base_url)
            .field("alpha_vantage_base_url", &self.alpha_vantage_base_url)
            .field("finnhub_rate_limit", &self.finnhub_rate_limit)
            .field("alpha_vantage_rate_limit", &self.alpha_vantage_rate_limit)
            .field("quote_ttl", &self.quote_ttl)
            .field("earnings_ttl", &self.earnings_ttl)
            .field("request_timeout", &self.request_timeout)
            .field("earnings_lookahead_days", &self.earnings_lookahead_days)
            .field("sweep_interval", &self.sweep_interval)
            .field("bucket_idle", &self.bucket_idle)
            .finish()
    }
}
