//! # Tickview Core
//!
//! Render pipeline for the single-ticker stock price dashboard.
//!
//! ## Overview
//!
//! One ticker value goes in, exactly one [`RenderResult`] comes out:
//!
//! - **Domain types** for tickers, lookback windows, and price series
//! - **Market-data client** trait with a Yahoo chart adapter
//! - **Request governor** that rate-limits provider calls and caches answers in DuckDB
//! - **History fetcher** with one explicit-date fallback for empty answers
//! - **Sanitizer, chart builder, and summary formatter** that turn a table into a figure
//! - **Render controller** that maps every failure to a user-facing message
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Provider adapters (Yahoo) |
//! | [`cache`] | Persistent history cache |
//! | [`chart`] | Plotly-compatible figures |
//! | [`config`] | Environment-driven settings |
//! | [`data_source`] | Client trait and request/error types |
//! | [`domain`] | Ticker, windows, ranges, series |
//! | [`error`] | Core error types |
//! | [`fetcher`] | Primary request plus fallback |
//! | [`http_client`] | HTTP client abstraction |
//! | [`render`] | Pipeline state machine and results |
//! | [`request_governor`] | Rate limit and cache decorator |
//! | [`sanitize`] | Raw table cleanup |
//! | [`service`] | Pipeline assembly |
//! | [`summary`] | Latest price and volume line |
//! | [`throttling`] | Admission limiter |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tickview_core::{DashboardConfig, DashboardService};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let service = DashboardService::from_config(DashboardConfig::from_env()?)?;
//!     let result = service.render("TSLA").await;
//!     println!("{}", result.chart().title());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  Web session    │
//! └────────┬────────┘
//!          │ ticker text
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ RenderController│────▶│ Sanitize / Chart │
//! └────────┬────────┘     │ / Summary        │
//!          │              └──────────────────┘
//!          ▼
//! ┌─────────────────┐
//! │ HistoryFetcher  │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ RequestGovernor │────▶│ DuckDB cache     │
//! └────────┬────────┘     └──────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ YahooAdapter    │────▶│ HTTP Client      │
//! └─────────────────┘     │ (reqwest/none)   │
//!                         └──────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! Render never fails: fetch and sanitize errors become a [`RenderResult::Failure`]
//! carrying an [`ErrorKind`]. Only service construction returns [`CoreError`].

pub mod adapters;
pub mod cache;
pub mod chart;
pub mod config;
pub mod data_source;
pub mod domain;
pub mod error;
pub mod fetcher;
pub mod http_client;
pub mod render;
pub mod request_governor;
pub mod sanitize;
pub mod service;
pub mod summary;
pub mod throttling;

// Adapter implementations
pub use adapters::YahooAdapter;

// Caching
pub use cache::{CacheError, CacheMode, HistoryCache};

// Charts
pub use chart::{Chart, ChartBuilder, LineTrace};

// Configuration
pub use config::DashboardConfig;

// Data source trait and types
pub use data_source::{HistoryRequest, MarketDataClient, SourceError, SourceErrorKind};

// Domain models
pub use domain::{
    currency_or_default, iso_date, validate_currency_code, LookbackWindow, PricePoint,
    PriceSeries, RawPoint, RawSeries, Ticker, TimeRange,
};

// Error types
pub use error::{CoreError, ValidationError};

// Fetching
pub use fetcher::{FetchError, FetchPolicy, HistoryFetcher};

// HTTP client types
pub use http_client::{
    HttpClient, HttpError, HttpRequest, HttpResponse, NoopHttpClient, ReqwestHttpClient,
};

// Rendering
pub use render::{ErrorKind, RenderController, RenderPhase, RenderResult, StatusText};

// Governor
pub use request_governor::RequestGovernor;

// Pipeline stages
pub use sanitize::{sanitize, SanitizeError, MIN_CHART_POINTS};
pub use summary::{format_price, format_summary, SummaryError};

// Service
pub use service::DashboardService;

// Throttling
pub use throttling::AdmissionLimiter;
