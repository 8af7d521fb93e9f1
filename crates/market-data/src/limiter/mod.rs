//! Per-key token bucket rate limiting.
//!
//! Providers each get their own [`RateLimiter`] sized to their API quota; the
//! HTTP layer uses one more limiter keyed by client identity.

mod rate_limiter;
mod sweeper;

pub use rate_limiter::{RateLimitConfig, RateLimiter};
pub use sweeper::SweeperHandle;
