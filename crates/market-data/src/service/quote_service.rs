use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info, warn};

use crate::cache::TtlCache;
use crate::errors::MarketDataError;
use crate::models::{Quote, Symbol};
use crate::provider::QuoteProvider;

/// Latest quotes with caching and a single fallback attempt.
///
/// Lookup order is cache, primary provider, fallback provider. Only a
/// successful, non-blank quote is cached. When both providers fail the
/// primary's error is returned inside [`MarketDataError::QuoteUnavailable`];
/// the fallback's error is logged and dropped.
pub struct QuoteService {
    primary: Arc<dyn QuoteProvider>,
    fallback: Arc<dyn QuoteProvider>,
    cache: TtlCache<Quote>,
}

impl QuoteService {
    pub fn new(
        primary: Arc<dyn QuoteProvider>,
        fallback: Arc<dyn QuoteProvider>,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            primary,
            fallback,
            cache: TtlCache::new(cache_ttl),
        }
    }

    /// Normalize `raw_symbol` and return its latest quote.
    pub async fn get_quote(&self, raw_symbol: &str) -> Result<Quote, MarketDataError> {
        let symbol = Symbol::parse(raw_symbol)?;
        self.get_quote_for(&symbol).await
    }

    pub async fn get_quote_for(&self, symbol: &Symbol) -> Result<Quote, MarketDataError> {
        if let Some(quote) = self.cache.get(symbol.as_str()) {
            debug!("Quote cache hit for {}", symbol);
            return Ok(quote);
        }

        let primary_error = match Self::fetch(self.primary.as_ref(), symbol).await {
            Ok(quote) => {
                self.cache.set(symbol.as_str(), quote.clone());
                return Ok(quote);
            }
            Err(e) => e,
        };
        warn!(
            "{} failed for {}: {}",
            self.primary.id(),
            symbol,
            primary_error
        );

        match Self::fetch(self.fallback.as_ref(), symbol).await {
            Ok(quote) => {
                info!("Quote for {} served by {}", symbol, self.fallback.id());
                self.cache.set(symbol.as_str(), quote.clone());
                Ok(quote)
            }
            Err(fallback_error) => {
                error!(
                    "{} fallback failed for {}: {}",
                    self.fallback.id(),
                    symbol,
                    fallback_error
                );
                Err(MarketDataError::QuoteUnavailable {
                    symbol: symbol.to_string(),
                    primary: Box::new(primary_error),
                })
            }
        }
    }

    /// Drop every cached quote.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    async fn fetch(provider: &dyn QuoteProvider, symbol: &Symbol) -> Result<Quote, MarketDataError> {
        let quote = provider.get_latest_quote(symbol).await?;
        if quote.is_blank() {
            return Err(MarketDataError::InvalidSymbol(symbol.to_string()));
        }
        Ok(quote)
    }
}
