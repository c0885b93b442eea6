//! Market-data client boundary.
//!
//! The pipeline consumes a single provider operation: daily history for one
//! ticker over one [`TimeRange`]. Adapters implement [`MarketDataClient`];
//! decorators such as the request governor implement it as well, so the
//! fetcher never knows whether it talks to the network or to a cache.
//!
//! # Example
//!
//! ```rust,ignore
//! use tickview_core::{HistoryRequest, LookbackWindow, MarketDataClient, Ticker, TimeRange, YahooAdapter};
//!
//! async fn print_rows(client: &YahooAdapter) -> Result<(), tickview_core::SourceError> {
//!     let ticker = Ticker::parse("TSLA")?;
//!     let request = HistoryRequest::new(ticker, TimeRange::period(LookbackWindow::Months(3)));
//!     let table = client.history(request).await?;
//!     println!("{} rows", table.len());
//!     Ok(())
//! }
//! ```

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use crate::{RawSeries, Ticker, TimeRange, ValidationError};

/// Adapter-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    Unavailable,
    RateLimited,
    InvalidRequest,
    Internal,
}

/// Structured source error carried up to the fetcher as a transport fault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
}

impl SourceError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::RateLimited,
            message: message.into(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::InvalidRequest,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Internal,
            message: message.into(),
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::RateLimited => "source.rate_limited",
            SourceErrorKind::InvalidRequest => "source.invalid_request",
            SourceErrorKind::Internal => "source.internal",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

impl From<ValidationError> for SourceError {
    fn from(error: ValidationError) -> Self {
        Self::invalid_request(error.to_string())
    }
}

/// Request payload for a daily history table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRequest {
    pub ticker: Ticker,
    pub range: TimeRange,
}

impl HistoryRequest {
    pub const fn new(ticker: Ticker, range: TimeRange) -> Self {
        Self { ticker, range }
    }

    /// Cache key for this request: `(ticker, range descriptor)`.
    pub fn cache_key(&self) -> String {
        format!("{}|{}", self.ticker, self.range.descriptor())
    }
}

/// Market-data client contract.
///
/// An empty table is a successful answer (unknown ticker, nothing traded in the
/// window); `Err` is reserved for transport faults and malformed responses.
///
/// Implementations must be `Send + Sync` as one instance is shared by every UI session.
pub trait MarketDataClient: Send + Sync {
    fn history<'a>(
        &'a self,
        req: HistoryRequest,
    ) -> Pin<Box<dyn Future<Output = Result<RawSeries, SourceError>> + Send + 'a>>;
}
