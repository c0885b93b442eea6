//! Plotly-compatible chart descriptions.
//!
//! The page hands [`Chart`] straight to `Plotly.react`, so field names follow the
//! plotly.js figure schema (`data`, `layout`, `hovertemplate`, ...).

use serde::Serialize;

use crate::{iso_date, LookbackWindow, PriceSeries, Ticker};

const PAPER_BACKGROUND: &str = "black";
const PLOT_BACKGROUND: &str = "black";
const FONT_COLOR: &str = "#f2f5fa";
const GRID_COLOR: &str = "#283442";
const LINE_COLOR: &str = "#636efa";
const LINE_WIDTH: f64 = 2.5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    pub data: Vec<LineTrace>,
    pub layout: Layout,
}

impl Chart {
    pub fn title(&self) -> &str {
        &self.layout.title.text
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineTrace {
    #[serde(rename = "type")]
    pub kind: String,
    pub mode: String,
    pub name: String,
    pub x: Vec<String>,
    pub y: Vec<f64>,
    pub text: Vec<String>,
    pub hovertemplate: String,
    pub line: LineStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineStyle {
    pub width: f64,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub title: Title,
    pub paper_bgcolor: String,
    pub plot_bgcolor: String,
    pub font: Font,
    pub xaxis: Axis,
    pub yaxis: Axis,
    pub showlegend: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Title {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Font {
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub title: Title,
    pub visible: bool,
    pub gridcolor: String,
    pub zeroline: bool,
}

impl Axis {
    fn labeled(text: impl Into<String>) -> Self {
        Self {
            title: Title { text: text.into() },
            visible: true,
            gridcolor: String::from(GRID_COLOR),
            zeroline: false,
        }
    }

    fn hidden() -> Self {
        Self {
            visible: false,
            ..Self::labeled("")
        }
    }
}

fn dark_layout(title: String, xaxis: Axis, yaxis: Axis) -> Layout {
    Layout {
        title: Title { text: title },
        paper_bgcolor: String::from(PAPER_BACKGROUND),
        plot_bgcolor: String::from(PLOT_BACKGROUND),
        font: Font {
            color: String::from(FONT_COLOR),
        },
        xaxis,
        yaxis,
        showlegend: false,
    }
}

/// Turns sanitized series into line charts. Pure: same input, same chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartBuilder {
    window: LookbackWindow,
}

impl ChartBuilder {
    pub const fn new(window: LookbackWindow) -> Self {
        Self { window }
    }

    pub fn build(&self, series: &PriceSeries, ticker: &Ticker) -> Chart {
        let points = series.points();
        let trace = LineTrace {
            kind: String::from("scatter"),
            mode: String::from("lines"),
            name: ticker.to_string(),
            x: points.iter().map(|point| iso_date(point.date)).collect(),
            y: points.iter().map(|point| point.close).collect(),
            text: points
                .iter()
                .map(|point| {
                    format!(
                        "{} {}, {}: ${:.2}",
                        point.date.month(),
                        point.date.day(),
                        point.date.year(),
                        point.close
                    )
                })
                .collect(),
            hovertemplate: String::from("%{text}<extra></extra>"),
            line: LineStyle {
                width: LINE_WIDTH,
                color: String::from(LINE_COLOR),
            },
        };

        Chart {
            data: vec![trace],
            layout: dark_layout(
                format!("{ticker} Stock Price ({})", self.window.label()),
                Axis::labeled("Date"),
                Axis::labeled(format!("Price ({})", series.currency())),
            ),
        }
    }

    /// Title-only chart with hidden axes, used on every failure path.
    pub fn error(message: &str) -> Chart {
        Chart {
            data: Vec::new(),
            layout: dark_layout(message.to_owned(), Axis::hidden(), Axis::hidden()),
        }
    }
}
