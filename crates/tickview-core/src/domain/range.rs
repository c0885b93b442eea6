use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use time::{Date, Duration};

use crate::LookbackWindow;

/// Canonical time range of a single history request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum TimeRange {
    /// Named relative period resolved by the provider.
    Period { window: LookbackWindow },
    /// Explicit calendar range; `end` is exclusive.
    Explicit { start: Date, end: Date },
}

impl TimeRange {
    pub const fn period(window: LookbackWindow) -> Self {
        Self::Period { window }
    }

    /// Explicit range of the same length as `window`, covering `today`.
    pub fn trailing(window: LookbackWindow, today: Date) -> Self {
        let end = today.saturating_add(Duration::days(1));
        Self::Explicit {
            start: window.start_from(end),
            end,
        }
    }

    /// Stable descriptor used as the range part of cache keys.
    pub fn descriptor(&self) -> String {
        match self {
            Self::Period { window } => format!("period:{}", window.period_code()),
            Self::Explicit { start, end } => {
                format!("range:{}..{}", iso_date(*start), iso_date(*end))
            }
        }
    }
}

impl Display for TimeRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.descriptor())
    }
}

/// Formats a date as `YYYY-MM-DD`.
pub fn iso_date(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}
