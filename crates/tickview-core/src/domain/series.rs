use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Ticker, ValidationError};

const DEFAULT_CURRENCY: &str = "USD";

/// One provider row before sanitization. Any field may be missing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawPoint {
    pub date: Option<Date>,
    pub close: Option<f64>,
    pub volume: Option<u64>,
}

impl RawPoint {
    pub const fn new(date: Option<Date>, close: Option<f64>, volume: Option<u64>) -> Self {
        Self {
            date,
            close,
            volume,
        }
    }
}

/// Daily history table as returned by a market-data client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSeries {
    pub ticker: Ticker,
    pub currency: String,
    pub rows: Vec<RawPoint>,
}

impl RawSeries {
    pub fn new(ticker: Ticker, currency: impl Into<String>, rows: Vec<RawPoint>) -> Self {
        Self {
            ticker,
            currency: currency.into(),
            rows,
        }
    }

    /// An empty table, the provider's answer for unknown tickers and empty windows.
    pub fn empty(ticker: Ticker) -> Self {
        Self::new(ticker, DEFAULT_CURRENCY, Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

/// A single validated daily observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: Date,
    pub close: f64,
    pub volume: u64,
}

impl PricePoint {
    pub const fn new(date: Date, close: f64, volume: u64) -> Self {
        Self {
            date,
            close,
            volume,
        }
    }
}

/// Time-ordered daily series with unique dates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    ticker: Ticker,
    currency: String,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Builds a series from points, ordering them by date.
    ///
    /// Length is not checked here; the sanitizer is the gate that guarantees a
    /// chartable series.
    pub fn from_points(ticker: Ticker, currency: impl Into<String>, mut points: Vec<PricePoint>) -> Self {
        points.sort_by_key(|point| point.date);
        Self {
            ticker,
            currency: currency.into(),
            points,
        }
    }

    pub fn ticker(&self) -> &Ticker {
        &self.ticker
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn latest(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl From<PriceSeries> for RawSeries {
    fn from(series: PriceSeries) -> Self {
        let rows = series
            .points
            .iter()
            .map(|point| RawPoint::new(Some(point.date), Some(point.close), Some(point.volume)))
            .collect();
        RawSeries::new(series.ticker, series.currency, rows)
    }
}

/// Validate and normalize currency to uppercase 3-letter code.
pub fn validate_currency_code(input: &str) -> Result<String, ValidationError> {
    let normalized = input.trim().to_ascii_uppercase();
    let is_valid = normalized.len() == 3 && normalized.chars().all(|ch| ch.is_ascii_alphabetic());

    if !is_valid {
        return Err(ValidationError::InvalidCurrency {
            value: input.to_owned(),
        });
    }

    Ok(normalized)
}

/// Normalizes a provider currency, falling back to USD when absent or malformed.
pub fn currency_or_default(input: Option<&str>) -> String {
    input
        .and_then(|value| validate_currency_code(value).ok())
        .unwrap_or_else(|| String::from(DEFAULT_CURRENCY))
}
