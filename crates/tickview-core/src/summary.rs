use thiserror::Error;

use crate::PriceSeries;

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum SummaryError {
    #[error("cannot summarize an empty series")]
    EmptySeries,
}

/// Formats the latest observation as `Current Price: $x,xxx.xx | Volume: n,nnn`.
pub fn format_summary(series: &PriceSeries) -> Result<String, SummaryError> {
    let latest = series.latest().ok_or(SummaryError::EmptySeries)?;
    Ok(format!(
        "Current Price: ${} | Volume: {}",
        format_price(latest.close),
        group_thousands(&latest.volume.to_string())
    ))
}

/// Two decimals with thousands separators, e.g. `1,234.50`.
pub fn format_price(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}{}.{fraction}", group_thousands(whole))
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PricePoint, Ticker};
    use time::{Date, Month};

    fn series(points: Vec<PricePoint>) -> PriceSeries {
        PriceSeries::from_points(Ticker::parse("TSLA").expect("ticker"), "USD", points)
    }

    fn day(d: u8) -> Date {
        Date::from_calendar_date(2024, Month::January, d).expect("date")
    }

    #[test]
    fn formats_latest_point() {
        let summary = format_summary(&series(vec![
            PricePoint::new(day(1), 100.0, 1_000),
            PricePoint::new(day(2), 105.5, 2_000),
        ]))
        .expect("summary");
        assert_eq!(summary, "Current Price: $105.50 | Volume: 2,000");
    }

    #[test]
    fn groups_large_values() {
        let summary = format_summary(&series(vec![
            PricePoint::new(day(1), 1.0, 1),
            PricePoint::new(day(2), 1_234_567.891, 104_654_200),
        ]))
        .expect("summary");
        assert_eq!(
            summary,
            "Current Price: $1,234,567.89 | Volume: 104,654,200"
        );
    }

    #[test]
    fn empty_series_fails() {
        assert_eq!(
            format_summary(&series(Vec::new())),
            Err(SummaryError::EmptySeries)
        );
    }

    #[test]
    fn price_formatting_edges() {
        assert_eq!(format_price(0.004), "0.00");
        assert_eq!(format_price(999.999), "1,000.00");
        assert_eq!(format_price(12.3), "12.30");
        assert_eq!(format_price(-1234.5), "-1,234.50");
    }
}
