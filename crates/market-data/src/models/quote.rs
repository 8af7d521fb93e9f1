use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Which provider produced a quote.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteSource {
    /// Primary provider
    Finnhub,
    /// Fallback provider
    AlphaVantage,
}

impl QuoteSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Finnhub => "finnhub",
            Self::AlphaVantage => "alphavantage",
        }
    }
}

impl fmt::Display for QuoteSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provider-agnostic latest quote for a symbol.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    /// Uppercase ticker
    pub symbol: String,

    /// Current (last traded) price
    pub price: Decimal,

    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,

    /// Previous session close
    pub prev_close: Decimal,

    /// Session volume; zero when the provider does not report it
    pub volume: u64,

    /// Quote time, epoch milliseconds on the wire
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,

    pub source: QuoteSource,
}

impl Quote {
    /// True when price, open, high and low are all zero.
    ///
    /// Providers answer unknown symbols this way instead of with an error
    /// status, so such a quote must never be returned or cached.
    pub fn is_blank(&self) -> bool {
        [self.price, self.open, self.high, self.low]
            .iter()
            .all(|v| v.is_zero())
    }
}
