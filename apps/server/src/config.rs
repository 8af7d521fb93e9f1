use std::{net::SocketAddr, time::Duration};

use anyhow::{bail, Context};
use folio_market_data::{MarketDataConfig, RateLimitConfig};

pub struct Config {
    pub listen_addr: SocketAddr,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    pub provider_timeout: Duration,
    pub finnhub_api_key: String,
    pub alpha_vantage_api_key: String,
    /// Per-client admission limit on the market data routes
    pub client_rate_limit: RateLimitConfig,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let listen_addr: SocketAddr = std::env::var("FOLIO_LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
            .parse()
            .context("Invalid FOLIO_LISTEN_ADDR")?;
        let cors_allow = std::env::var("FOLIO_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|_| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let timeout_ms = env_or("FOLIO_REQUEST_TIMEOUT_MS", 30_000u64);
        let provider_timeout_ms = env_or("FOLIO_PROVIDER_TIMEOUT_MS", 10_000u64);
        let requests_per_minute = env_or("RATE_LIMIT_REQUESTS_PER_MINUTE", 30u32);
        let burst_capacity = env_or("RATE_LIMIT_BURST_CAPACITY", 60u32);

        Ok(Self {
            listen_addr,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
            provider_timeout: Duration::from_millis(provider_timeout_ms),
            finnhub_api_key: required_env("FINNHUB_API_KEY")?,
            alpha_vantage_api_key: required_env("ALPHA_VANTAGE_API_KEY")?,
            client_rate_limit: RateLimitConfig::new(requests_per_minute, burst_capacity),
        })
    }

    pub fn market_data_config(&self) -> MarketDataConfig {
        MarketDataConfig::new(
            self.finnhub_api_key.clone(),
            self.alpha_vantage_api_key.clone(),
        )
        .with_request_timeout(self.provider_timeout)
    }
}

/// Parse an optional numeric variable, keeping the default when unset or invalid.
fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn required_env(name: &str) -> anyhow::Result<String> {
    let value = std::env::var(name).unwrap_or_default();
    if value.trim().is_empty() {
        bail!("{} must be set", name);
    }
    Ok(value.trim().to_string())
}
