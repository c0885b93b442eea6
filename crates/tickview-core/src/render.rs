//! Ticker-change entry point: fetch, sanitize, and render one result.
//!
//! ```text
//! Idle ──▶ Fetching ──▶ Sanitizing ──▶ Rendering ──▶ Idle
//!   │          │             │
//!   └──────────┴─────────────┴──▶ ErrorRendering ──▶ Idle
//! ```
//!
//! Every invocation produces exactly one [`RenderResult`]; no error escapes.

use std::fmt::{Display, Formatter};

use serde::Serialize;

use crate::chart::{Chart, ChartBuilder};
use crate::fetcher::{FetchError, HistoryFetcher};
use crate::sanitize::{sanitize, SanitizeError};
use crate::summary::format_summary;
use crate::Ticker;

const EMPTY_INPUT_MESSAGE: &str = "Enter a ticker symbol";
const FETCH_FAILURE_STATUS: &str = "❌ Check ticker or connection";
const FAILURE_COLOR: &str = "red";

/// Pipeline phase, logged on every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderPhase {
    Idle,
    Fetching,
    Sanitizing,
    Rendering,
    ErrorRendering,
}

impl Display for RenderPhase {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Fetching => "fetching",
            Self::Sanitizing => "sanitizing",
            Self::Rendering => "rendering",
            Self::ErrorRendering => "error_rendering",
        })
    }
}

/// Failure classification shown to the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    EmptyInput,
    NoData,
    Transport,
    EmptySeries,
    InsufficientPoints,
}

/// Short styled text node rendered under the chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusText {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl StatusText {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: None,
        }
    }

    fn failure(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: Some(String::from(FAILURE_COLOR)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum RenderResult {
    Success {
        chart: Chart,
        summary: StatusText,
    },
    Failure {
        kind: ErrorKind,
        message: String,
        chart: Chart,
        status: StatusText,
    },
}

impl RenderResult {
    pub fn failure(kind: ErrorKind, message: impl Into<String>) -> Self {
        let message = message.into();
        let status = match kind {
            ErrorKind::NoData | ErrorKind::Transport => StatusText::failure(FETCH_FAILURE_STATUS),
            ErrorKind::EmptyInput | ErrorKind::EmptySeries | ErrorKind::InsufficientPoints => {
                StatusText::failure(message.clone())
            }
        };
        Self::Failure {
            kind,
            chart: ChartBuilder::error(&message),
            message,
            status,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn chart(&self) -> &Chart {
        match self {
            Self::Success { chart, .. } | Self::Failure { chart, .. } => chart,
        }
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { kind, .. } => Some(*kind),
        }
    }
}

fn fetch_failure(error: &FetchError) -> RenderResult {
    match error {
        FetchError::NoData { ticker } => {
            RenderResult::failure(ErrorKind::NoData, format!("No data found for '{ticker}'"))
        }
        FetchError::Transport { ticker, cause } => RenderResult::failure(
            ErrorKind::Transport,
            format!("Error: '{ticker}' not found or no internet ({})", cause.message()),
        ),
    }
}

fn sanitize_failure(ticker: &Ticker, error: SanitizeError) -> RenderResult {
    match error {
        SanitizeError::Empty => RenderResult::failure(
            ErrorKind::EmptySeries,
            format!("No usable price data for '{ticker}'"),
        ),
        SanitizeError::InsufficientPoints { found } => RenderResult::failure(
            ErrorKind::InsufficientPoints,
            format!("Not enough price data to chart '{ticker}' ({found} point(s))"),
        ),
    }
}

/// Sequences fetch, sanitize, chart, and summary for one ticker value.
#[derive(Clone)]
pub struct RenderController {
    fetcher: HistoryFetcher,
    charts: ChartBuilder,
}

impl RenderController {
    pub fn new(fetcher: HistoryFetcher) -> Self {
        let charts = ChartBuilder::new(fetcher.policy().window);
        Self { fetcher, charts }
    }

    pub async fn render(&self, input: &str) -> RenderResult {
        let result = self.run(input).await;
        transition(RenderPhase::Idle, input);
        result
    }

    async fn run(&self, input: &str) -> RenderResult {
        let Ok(ticker) = Ticker::parse(input) else {
            transition(RenderPhase::ErrorRendering, input);
            return RenderResult::failure(ErrorKind::EmptyInput, EMPTY_INPUT_MESSAGE);
        };

        transition(RenderPhase::Fetching, input);
        let raw = match self.fetcher.fetch(&ticker).await {
            Ok(raw) => raw,
            Err(error) => {
                transition(RenderPhase::ErrorRendering, input);
                return fetch_failure(&error);
            }
        };

        transition(RenderPhase::Sanitizing, input);
        let series = match sanitize(&raw) {
            Ok(series) => series,
            Err(error) => {
                transition(RenderPhase::ErrorRendering, input);
                return sanitize_failure(&ticker, error);
            }
        };

        transition(RenderPhase::Rendering, input);
        let chart = self.charts.build(&series, &ticker);
        match format_summary(&series) {
            Ok(summary) => RenderResult::Success {
                chart,
                summary: StatusText::plain(summary),
            },
            Err(_) => {
                transition(RenderPhase::ErrorRendering, input);
                sanitize_failure(&ticker, SanitizeError::InsufficientPoints { found: 0 })
            }
        }
    }
}

fn transition(phase: RenderPhase, input: &str) {
    tracing::debug!(%phase, ticker = input.trim(), "render phase");
}
