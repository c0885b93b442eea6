use std::collections::BTreeMap;

use thiserror::Error;

use crate::{PricePoint, PriceSeries, RawSeries};

/// Minimum number of points needed to draw a line segment.
pub const MIN_CHART_POINTS: usize = 2;

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum SanitizeError {
    #[error("no valid price rows")]
    Empty,
    #[error("only {found} valid price row(s); at least {MIN_CHART_POINTS} are needed")]
    InsufficientPoints { found: usize },
}

/// Cleans a provider table into a chartable series.
///
/// Rows without a date or close, or with a non-finite or non-positive close,
/// are dropped. Missing volume counts as zero. The result is ordered by date and
/// keeps the last row seen for a repeated date.
pub fn sanitize(raw: &RawSeries) -> Result<PriceSeries, SanitizeError> {
    let mut by_date = BTreeMap::new();
    for row in &raw.rows {
        let (Some(date), Some(close)) = (row.date, row.close) else {
            continue;
        };
        if !close.is_finite() || close <= 0.0 {
            continue;
        }
        by_date.insert(date, PricePoint::new(date, close, row.volume.unwrap_or(0)));
    }

    match by_date.len() {
        0 => Err(SanitizeError::Empty),
        found if found < MIN_CHART_POINTS => Err(SanitizeError::InsufficientPoints { found }),
        _ => Ok(PriceSeries::from_points(
            raw.ticker.clone(),
            raw.currency.clone(),
            by_date.into_values().collect(),
        )),
    }
}
