//! History fetch with a single explicit-date fallback.

use std::sync::Arc;

use thiserror::Error;
use time::OffsetDateTime;

use crate::data_source::{HistoryRequest, MarketDataClient, SourceError};
use crate::{LookbackWindow, RawSeries, Ticker, TimeRange};

/// Fetch failures surfaced to the render controller.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("no data found for '{ticker}'")]
    NoData { ticker: Ticker },

    #[error("fetching '{ticker}' failed: {cause}")]
    Transport { ticker: Ticker, cause: SourceError },
}

/// Window and retry policy for history fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchPolicy {
    pub window: LookbackWindow,
    /// Retry once with explicit dates when the named-period request is empty.
    pub explicit_fallback: bool,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            window: LookbackWindow::default(),
            explicit_fallback: true,
        }
    }
}

/// Orchestrates the primary period request and its fallback.
#[derive(Clone)]
pub struct HistoryFetcher {
    client: Arc<dyn MarketDataClient>,
    policy: FetchPolicy,
}

impl HistoryFetcher {
    pub fn new(client: Arc<dyn MarketDataClient>, policy: FetchPolicy) -> Self {
        Self { client, policy }
    }

    pub fn policy(&self) -> FetchPolicy {
        self.policy
    }

    /// Fetches the trailing window for `ticker`.
    ///
    /// An empty primary answer is retried exactly once with an explicit date
    /// range of the same length. Transport faults are never retried.
    pub async fn fetch(&self, ticker: &Ticker) -> Result<RawSeries, FetchError> {
        let primary = TimeRange::period(self.policy.window);
        let table = self.attempt(ticker, primary).await?;
        if !table.is_empty() {
            return Ok(table);
        }

        if !self.policy.explicit_fallback {
            return Err(FetchError::NoData {
                ticker: ticker.clone(),
            });
        }

        let fallback = TimeRange::trailing(self.policy.window, OffsetDateTime::now_utc().date());
        tracing::info!(%ticker, range = %fallback, "period request was empty; retrying with explicit dates");

        let table = self.attempt(ticker, fallback).await?;
        if table.is_empty() {
            return Err(FetchError::NoData {
                ticker: ticker.clone(),
            });
        }
        Ok(table)
    }

    async fn attempt(&self, ticker: &Ticker, range: TimeRange) -> Result<RawSeries, FetchError> {
        self.client
            .history(HistoryRequest::new(ticker.clone(), range))
            .await
            .map_err(|cause| {
                tracing::warn!(%ticker, %range, %cause, "history request failed");
                FetchError::Transport {
                    ticker: ticker.clone(),
                    cause,
                }
            })
    }
}
