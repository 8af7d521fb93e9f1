//! Market data models
//!
//! - `symbol` - Validated, uppercase ticker (Symbol)
//! - `quote` - Normalized latest quote (Quote, QuoteSource)
//! - `earnings` - Earnings calendar rows and the selected record (EarningsRecord, EarningsHour)

mod earnings;
mod quote;
mod symbol;

pub use earnings::{EarningsCalendarEntry, EarningsHour, EarningsRecord, EarningsSource};
pub use quote::{Quote, QuoteSource};
pub use symbol::Symbol;
