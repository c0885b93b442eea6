//! # Domain Models
//!
//! Canonical domain types for the tickview render pipeline.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Ticker`] | User-supplied ticker, uppercase |
//! | [`LookbackWindow`] | Trailing window (90d, 3mo, 1y) |
//! | [`TimeRange`] | Named period or explicit date range of one request |
//! | [`RawSeries`] | Provider table before sanitization |
//! | [`PriceSeries`] | Sanitized, date-ordered daily series |
//!
//! Raw rows keep missing fields as `None`; only the sanitizer turns them into
//! [`PricePoint`] values, which is what lets charting and summary code assume
//! every point carries a date and a positive close.

mod range;
mod series;
mod ticker;
mod window;

pub use range::{iso_date, TimeRange};
pub use series::{
    currency_or_default, validate_currency_code, PricePoint, PriceSeries, RawPoint, RawSeries,
};
pub use ticker::Ticker;
pub use window::LookbackWindow;
