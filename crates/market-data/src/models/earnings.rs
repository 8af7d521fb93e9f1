use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Session in which earnings are reported.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EarningsHour {
    /// Before market open
    Bmo,
    /// After market close
    Amc,
    /// During market hours
    Dmh,
}

impl EarningsHour {
    /// Map a provider's free-text session hint onto the three sessions.
    ///
    /// Empty text means the provider does not know, which yields `None`.
    /// Anything that is neither "before" nor "after" counts as during hours.
    pub fn from_provider_text(text: &str) -> Option<Self> {
        let normalized = text.trim().to_lowercase();
        if normalized.is_empty() {
            return None;
        }

        if normalized.contains("before") || normalized == "bmo" {
            Some(Self::Bmo)
        } else if normalized.contains("after") || normalized == "amc" {
            Some(Self::Amc)
        } else {
            Some(Self::Dmh)
        }
    }
}

/// Which provider produced an earnings record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EarningsSource {
    Finnhub,
}

/// Next scheduled earnings report for a symbol.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EarningsRecord {
    pub symbol: String,
    /// Report date, never in the past at fetch time
    pub earnings_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hour: Option<EarningsHour>,
    pub source: EarningsSource,
}

/// One row of a provider's earnings calendar, after wire decoding.
#[derive(Clone, Debug, PartialEq)]
pub struct EarningsCalendarEntry {
    pub symbol: String,
    pub date: NaiveDate,
    /// Raw session hint as sent by the provider
    pub hour: Option<String>,
    pub eps_estimate: Option<f64>,
    pub revenue_estimate: Option<f64>,
}
