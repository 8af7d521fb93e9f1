//! Defaults shared by the quote and earnings paths.

use std::time::Duration;

/// How long a quote stays fresh in the cache.
pub const DEFAULT_QUOTE_TTL: Duration = Duration::from_secs(60);

/// Earnings dates move rarely, so they are cached for a day.
pub const DEFAULT_EARNINGS_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Upper bound for a single provider HTTP call.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Size of the earnings calendar window, counted from today.
pub const EARNINGS_LOOKAHEAD_DAYS: u64 = 90;

/// Wait suggested after a provider reports its own quota hit without saying
/// how long to back off. Both providers meter per minute.
pub const DEFAULT_PROVIDER_RETRY_AFTER: Duration = Duration::from_secs(60);

/// How often idle rate-limit buckets are swept.
pub const BUCKET_SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Buckets not refilled within this window are dropped by the sweep.
pub const BUCKET_IDLE_WINDOW: Duration = Duration::from_secs(5 * 60);

/// Longest accepted ticker symbol.
pub const MAX_SYMBOL_LEN: usize = 7;

// Free tier of Finnhub: 60 calls per minute.
pub const FINNHUB_REQUESTS_PER_MINUTE: u32 = 60;
pub const FINNHUB_BURST_CAPACITY: u32 = 60;

// Free tier of Alpha Vantage: 5 calls per minute.
pub const ALPHA_VANTAGE_REQUESTS_PER_MINUTE: u32 = 5;
pub const ALPHA_VANTAGE_BURST_CAPACITY: u32 = 5;
