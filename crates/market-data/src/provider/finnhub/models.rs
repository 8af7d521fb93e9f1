//! Finnhub wire shapes.

use serde::Deserialize;

/// Response from /quote endpoint.
///
/// Finnhub answers unknown symbols with every price set to zero rather than
/// an error status.
#[derive(Debug, Deserialize)]
pub(super) struct QuoteResponse {
    /// Current price
    #[serde(default)]
    pub c: f64,
    /// High price of the day
    #[serde(default)]
    pub h: f64,
    /// Low price of the day
    #[serde(default)]
    pub l: f64,
    /// Open price of the day
    #[serde(default)]
    pub o: f64,
    /// Previous close
    #[serde(default)]
    pub pc: f64,
    /// Timestamp (Unix seconds)
    pub t: Option<i64>,
    // Note: d (change) and dp (percent change) exist but are not used
}

/// Response from /calendar/earnings endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct EarningsCalendarResponse {
    #[serde(default)]
    pub earnings_calendar: Vec<EarningsCalendarItem>,
}

/// One scheduled report.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct EarningsCalendarItem {
    pub symbol: String,
    /// YYYY-MM-DD
    pub date: String,
    /// "bmo", "amc", "dmh" or empty
    #[serde(default)]
    pub hour: Option<String>,
    #[serde(default)]
    pub eps_estimate: Option<f64>,
    #[serde(default)]
    pub revenue_estimate: Option<f64>,
    // Note: epsActual, revenueActual, quarter and year exist but are not used
}
