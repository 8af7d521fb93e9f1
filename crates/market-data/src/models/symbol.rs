use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::constants::MAX_SYMBOL_LEN;
use crate::errors::MarketDataError;

/// Normalized ticker symbol.
///
/// Always uppercase, 1 to 7 characters drawn from `A-Z`, `0-9`, `.` and `-`.
/// Construction is the single place where caller input is trimmed and
/// case-folded, so `"aapl"` and `"AAPL"` produce equal symbols.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    /// Normalize and validate raw caller input.
    pub fn parse(raw: &str) -> Result<Self, MarketDataError> {
        let normalized = raw.trim().to_ascii_uppercase();

        if normalized.is_empty() {
            return Err(MarketDataError::InvalidInput(
                "Symbol is required".to_string(),
            ));
        }

        if normalized.len() > MAX_SYMBOL_LEN {
            return Err(MarketDataError::InvalidInput(format!(
                "Symbol must be {} characters or less",
                MAX_SYMBOL_LEN
            )));
        }

        if !normalized
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '.' || c == '-')
        {
            return Err(MarketDataError::InvalidInput(
                "Symbol must contain only uppercase letters, numbers, dots, and hyphens"
                    .to_string(),
            ));
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Symbol {
    type Err = MarketDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
