//! Token bucket rate limiter keyed by an opaque scope string.
//!
//! A scope can be a provider name (one limiter per provider quota) or a client
//! identity (one limiter shared by all clients). Buckets are created full on
//! first access and refilled lazily on every access.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use log::{debug, warn};

/// Default refill rate for client-facing limits.
const DEFAULT_REQUESTS_PER_MINUTE: u32 = 30;

/// Default burst for client-facing limits.
const DEFAULT_BURST_CAPACITY: u32 = 60;

const MILLIS_PER_MINUTE: f64 = 60_000.0;

/// Token bucket for a single key.
#[derive(Debug)]
struct TokenBucket {
    /// Current number of available tokens.
    tokens: f64,
    /// Last time the bucket was refilled.
    last_refill: Instant,
    /// Maximum bucket capacity.
    capacity: f64,
    /// Tokens added per minute.
    refill_rate: f64,
}

impl TokenBucket {
    fn full(config: &RateLimitConfig, now: Instant) -> Self {
        Self {
            tokens: config.burst_capacity as f64,
            last_refill: now,
            capacity: config.burst_capacity as f64,
            refill_rate: config.requests_per_minute as f64,
        }
    }

    /// Add whole tokens for the time elapsed since the last refill.
    ///
    /// The refill clock always moves to `now`, so an interval too short to
    /// earn a whole token is not carried over.
    fn refill(&mut self, now: Instant) {
        let elapsed_ms = now.saturating_duration_since(self.last_refill).as_millis() as f64;
        let tokens_to_add = (elapsed_ms * self.refill_rate / MILLIS_PER_MINUTE).floor();

        self.tokens = (self.tokens + tokens_to_add).min(self.capacity);
        self.last_refill = now;
    }

    fn try_consume(&mut self) -> bool {
        if self.tokens > 0.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Wait until one whole token is due, assuming no other access.
    fn time_until_available(&self) -> Duration {
        if self.tokens > 0.0 {
            Duration::ZERO
        } else if self.refill_rate <= 0.0 {
            Duration::MAX
        } else {
            Duration::from_secs_f64(60.0 / self.refill_rate)
        }
    }
}

/// Rate limiter configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Tokens added per minute.
    pub requests_per_minute: u32,
    /// Maximum burst capacity.
    pub burst_capacity: u32,
}

impl RateLimitConfig {
    pub const fn new(requests_per_minute: u32, burst_capacity: u32) -> Self {
        Self {
            requests_per_minute,
            burst_capacity,
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self::new(DEFAULT_REQUESTS_PER_MINUTE, DEFAULT_BURST_CAPACITY)
    }
}

/// Keyed token bucket rate limiter.
///
/// Thread-safe; every operation holds the bucket map lock only for the
/// in-memory refill and update. Use [`consume_token`](Self::consume_token) to
/// admit a request: [`check_limit`](Self::check_limit) followed by a separate
/// consume is not atomic.
pub struct RateLimiter {
    config: RateLimitConfig,
    buckets: Mutex<HashMap<String, TokenBucket>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            buckets: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> RateLimitConfig {
        self.config
    }

    /// Lock the buckets mutex, recovering from poison if necessary.
    ///
    /// Worst case after a poisoned lock is a slightly off token count.
    fn lock_buckets(&self) -> MutexGuard<'_, HashMap<String, TokenBucket>> {
        self.buckets.lock().unwrap_or_else(|poisoned| {
            warn!("Rate limiter buckets mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn with_bucket<R>(&self, key: &str, now: Instant, f: impl FnOnce(&mut TokenBucket) -> R) -> R {
        let mut buckets = self.lock_buckets();
        let bucket = buckets
            .entry(key.to_string())
            .or_insert_with(|| TokenBucket::full(&self.config, now));
        bucket.refill(now);
        f(bucket)
    }

    /// True if `key` has at least one token. Refills but does not consume.
    pub fn check_limit(&self, key: &str) -> bool {
        self.check_limit_at(key, Instant::now())
    }

    /// Take one token for `key`. Returns false, leaving the bucket untouched,
    /// when none is available.
    pub fn consume_token(&self, key: &str) -> bool {
        self.consume_token_at(key, Instant::now())
    }

    /// Current token count for `key`, after refill.
    pub fn remaining_tokens(&self, key: &str) -> f64 {
        self.remaining_tokens_at(key, Instant::now())
    }

    /// How long until `key` would be admitted again.
    pub fn time_until_available(&self, key: &str) -> Duration {
        self.with_bucket(key, Instant::now(), |bucket| bucket.time_until_available())
    }

    /// Drop every bucket not refilled within `idle`. Returns how many were
    /// removed.
    pub fn sweep_idle(&self, idle: Duration) -> usize {
        self.sweep_idle_at(Instant::now(), idle)
    }

    /// Number of live buckets.
    pub fn bucket_count(&self) -> usize {
        self.lock_buckets().len()
    }

    pub(crate) fn check_limit_at(&self, key: &str, now: Instant) -> bool {
        self.with_bucket(key, now, |bucket| bucket.tokens > 0.0)
    }

    pub(crate) fn consume_token_at(&self, key: &str, now: Instant) -> bool {
        let admitted = self.with_bucket(key, now, TokenBucket::try_consume);
        if !admitted {
            debug!("Rate limiter: no tokens left for '{}'", key);
        }
        admitted
    }

    pub(crate) fn remaining_tokens_at(&self, key: &str, now: Instant) -> f64 {
        self.with_bucket(key, now, |bucket| bucket.tokens)
    }

    pub(crate) fn sweep_idle_at(&self, now: Instant, idle: Duration) -> usize {
        let mut buckets = self.lock_buckets();
        let before = buckets.len();
        buckets.retain(|_, bucket| now.saturating_duration_since(bucket.last_refill) <= idle);
        before - buckets.len()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}
