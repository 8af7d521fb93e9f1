//! Folio Market Data Crate
//!
//! This crate fetches latest quotes and upcoming earnings dates from
//! third-party providers on behalf of the Folio server.
//!
//! # Overview
//!
//! The market data crate supports:
//! - Latest quotes from Finnhub, with Alpha Vantage as fallback
//! - Next earnings date from the Finnhub earnings calendar
//! - Per-provider token bucket rate limiting
//! - Short-lived in-memory caching of results
//!
//! # Architecture
//!
//! ```text
//! +------------------+
//! |  QuoteService /  |  normalize symbol, cache lookup
//! |  EarningsService |
//! +------------------+
//!          |
//!          v
//! +------------------+     +------------------+
//! |    Provider      | --> |   RateLimiter    |  (one bucket per provider)
//! +------------------+     +------------------+
//!          |
//!          v
//! +------------------+
//! |  HttpTransport   |  (reqwest, or a mock in tests)
//! +------------------+
//!          |
//!          v
//! +------------------+
//! | Quote / Earnings |  (provider-agnostic records)
//! +------------------+
//! ```
//!
//! # Core Types
//!
//! - [`Symbol`] - Validated uppercase ticker
//! - [`Quote`] - Latest price snapshot tagged with its source
//! - [`EarningsRecord`] - Next scheduled report for a symbol
//! - [`MarketDataError`] - Error taxonomy with transport status mapping

pub mod cache;
pub mod config;
pub mod constants;
pub mod errors;
pub mod http;
pub mod limiter;
pub mod models;
pub mod provider;
pub mod service;

pub use cache::TtlCache;
pub use config::MarketDataConfig;
pub use errors::{ErrorKind, MarketDataError};
pub use http::{HttpTransport, ReqwestTransport};
pub use limiter::{RateLimitConfig, RateLimiter, SweeperHandle};
pub use models::{
    EarningsCalendarEntry, EarningsHour, EarningsRecord, EarningsSource, Quote, QuoteSource, Symbol,
};
pub use provider::alpha_vantage::AlphaVantageProvider;
pub use provider::finnhub::FinnhubProvider;
pub use provider::{EarningsCalendarProvider, QuoteProvider};
pub use service::{EarningsService, MarketDataServices, QuoteService};
