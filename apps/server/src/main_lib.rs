use std::sync::{Arc, Mutex};

use crate::config::Config;
use folio_market_data::{
    EarningsService, HttpTransport, MarketDataServices, QuoteService, RateLimiter,
    ReqwestTransport, SweeperHandle,
};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub struct AppState {
    pub quote_service: Arc<QuoteService>,
    pub earnings_service: Arc<EarningsService>,
    /// Shared by all clients, keyed by client identity.
    pub client_limiter: Arc<RateLimiter>,
    sweepers: Mutex<Vec<SweeperHandle>>,
}

impl AppState {
    /// Stop the background bucket sweeps.
    pub async fn shutdown(&self) {
        let handles = std::mem::take(
            &mut *self
                .sweepers
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner()),
        );
        for handle in handles {
            handle.shutdown().await;
        }
        tracing::debug!("Rate limiter sweepers stopped");
    }
}

pub fn init_tracing() {
    let log_format = std::env::var("FOLIO_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    build_state_with_transport(config, Arc::new(ReqwestTransport::new())).await
}

/// Build the state over a caller-supplied transport. Must run inside a Tokio
/// runtime, since the limiter sweeps are spawned here.
pub async fn build_state_with_transport(
    config: &Config,
    transport: Arc<dyn HttpTransport>,
) -> anyhow::Result<Arc<AppState>> {
    let market_data_config = config.market_data_config();
    let (sweep_interval, bucket_idle) = (
        market_data_config.sweep_interval,
        market_data_config.bucket_idle,
    );
    let market_data = MarketDataServices::build(market_data_config, transport);

    let client_limiter = Arc::new(RateLimiter::new(config.client_rate_limit));
    let mut sweepers = market_data.spawn_sweepers();
    sweepers.push(client_limiter.spawn_sweeper(sweep_interval, bucket_idle));

    tracing::info!(
        "Market data ready: client limit {}/min (burst {}), provider timeout {:?}",
        config.client_rate_limit.requests_per_minute,
        config.client_rate_limit.burst_capacity,
        config.provider_timeout
    );

    Ok(Arc::new(AppState {
        quote_service: market_data.quotes.clone(),
        earnings_service: market_data.earnings.clone(),
        client_limiter,
        sweepers: Mutex::new(sweepers),
    }))
}
