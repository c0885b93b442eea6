use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::{Date, Duration, Month};

use crate::ValidationError;

/// Trailing lookback window used for history requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum LookbackWindow {
    Days(u16),
    Months(u16),
    Years(u16),
}

impl Default for LookbackWindow {
    fn default() -> Self {
        Self::Months(3)
    }
}

impl LookbackWindow {
    /// Provider period code, e.g. `90d`, `3mo`, `1y`.
    pub fn period_code(self) -> String {
        match self {
            Self::Days(n) => format!("{n}d"),
            Self::Months(n) => format!("{n}mo"),
            Self::Years(n) => format!("{n}y"),
        }
    }

    /// Human-readable label used in chart titles.
    pub fn label(self) -> String {
        let (count, unit) = match self {
            Self::Days(n) => (n, "Day"),
            Self::Months(n) => (n, "Month"),
            Self::Years(n) => (n, "Year"),
        };

        if count == 1 {
            format!("Last {unit}")
        } else {
            format!("Last {count} {unit}s")
        }
    }

    /// First day of the window ending at `end`, using calendar months and years.
    ///
    /// Month arithmetic clamps the day to the length of the target month, so the
    /// three months before May 31st start on February 28th (or 29th).
    pub fn start_from(self, end: Date) -> Date {
        match self {
            Self::Days(n) => end.saturating_sub(Duration::days(i64::from(n))),
            Self::Months(n) => shift_months_back(end, u32::from(n)),
            Self::Years(n) => shift_months_back(end, u32::from(n) * 12),
        }
    }
}

fn shift_months_back(end: Date, months: u32) -> Date {
    let index = end.year() * 12 + i32::from(u8::from(end.month())) - 1 - months as i32;
    let year = index.div_euclid(12);
    let month_number = (index.rem_euclid(12) + 1) as u8;

    let shifted = Month::try_from(month_number).and_then(|month| {
        let day = end.day().min(time::util::days_in_year_month(year, month));
        Date::from_calendar_date(year, month, day)
    });

    shifted.unwrap_or(Date::MIN)
}

impl Display for LookbackWindow {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.period_code())
    }
}

impl FromStr for LookbackWindow {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        let split = normalized
            .find(|ch: char| !ch.is_ascii_digit())
            .unwrap_or(normalized.len());
        let (digits, unit) = normalized.split_at(split);

        let count: u16 = digits.parse().map_err(|_| ValidationError::InvalidWindow {
            value: value.to_owned(),
        })?;
        if count == 0 {
            return Err(ValidationError::ZeroWindow);
        }

        match unit {
            "d" => Ok(Self::Days(count)),
            "mo" => Ok(Self::Months(count)),
            "y" => Ok(Self::Years(count)),
            _ => Err(ValidationError::InvalidWindow {
                value: value.to_owned(),
            }),
        }
    }
}

impl TryFrom<String> for LookbackWindow {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<LookbackWindow> for String {
    fn from(value: LookbackWindow) -> Self {
        value.period_code()
    }
}
