//! Quote and earnings orchestration.
//!
//! [`MarketDataServices::build`] wires the production providers, their rate
//! limiters and both services from a [`MarketDataConfig`]. Tests construct
//! [`QuoteService`] and [`EarningsService`] directly over mock providers.

mod earnings_service;
mod quote_service;

#[cfg(test)]
mod service_tests;

pub use earnings_service::EarningsService;
pub use quote_service::QuoteService;

use std::sync::Arc;

use crate::config::MarketDataConfig;
use crate::http::HttpTransport;
use crate::limiter::{RateLimiter, SweeperHandle};
use crate::provider::alpha_vantage::AlphaVantageProvider;
use crate::provider::finnhub::FinnhubProvider;

/// Long-lived services plus the provider limiters they draw from.
pub struct MarketDataServices {
    pub quotes: Arc<QuoteService>,
    pub earnings: Arc<EarningsService>,
    limiters: Vec<Arc<RateLimiter>>,
    config: MarketDataConfig,
}

impl MarketDataServices {
    /// Build both services over `transport`.
    ///
    /// Each quote provider draws from its own limiter, so an empty primary
    /// bucket never blocks the fallback and the reverse. The earnings calendar
    /// is not metered by the quote limiter.
    pub fn build(config: MarketDataConfig, transport: Arc<dyn HttpTransport>) -> Self {
        let finnhub_limiter = Arc::new(RateLimiter::new(config.finnhub_rate_limit));
        let alpha_vantage_limiter = Arc::new(RateLimiter::new(config.alpha_vantage_rate_limit));

        let finnhub = Arc::new(
            FinnhubProvider::new(
                config.finnhub_api_key.clone(),
                transport.clone(),
                finnhub_limiter.clone(),
            )
            .with_base_url(config.finnhub_base_url.clone())
            .with_timeout(config.request_timeout),
        );
        let alpha_vantage = Arc::new(
            AlphaVantageProvider::new(
                config.alpha_vantage_api_key.clone(),
                transport,
                alpha_vantage_limiter.clone(),
            )
            .with_base_url(config.alpha_vantage_base_url.clone())
            .with_timeout(config.request_timeout),
        );

        let quotes = Arc::new(QuoteService::new(
            finnhub.clone(),
            alpha_vantage,
            config.quote_ttl,
        ));
        let earnings = Arc::new(EarningsService::new(
            finnhub,
            config.earnings_ttl,
            config.earnings_lookahead_days,
        ));

        Self {
            quotes,
            earnings,
            limiters: vec![finnhub_limiter, alpha_vantage_limiter],
            config,
        }
    }

    /// Start the idle-bucket sweep for every provider limiter.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn_sweepers(&self) -> Vec<SweeperHandle> {
        self.limiters
            .iter()
            .map(|limiter| limiter.spawn_sweeper(self.config.sweep_interval, self.config.bucket_idle))
            .collect()
    }
}
