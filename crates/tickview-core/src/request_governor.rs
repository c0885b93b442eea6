//! Rate-limited, cached wrapper around a market-data client.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::cache::{CacheMode, HistoryCache};
use crate::data_source::{HistoryRequest, MarketDataClient, SourceError};
use crate::throttling::AdmissionLimiter;
use crate::RawSeries;

/// Decorator that serves repeated requests from the persistent cache and
/// admits the rest through a fixed-rate limiter.
///
/// Cache hits never consume a limiter slot and never reach the inner client.
/// Cache faults are logged and treated as misses so a broken cache file can
/// only cost an upstream call, never a render.
#[derive(Clone)]
pub struct RequestGovernor {
    inner: Arc<dyn MarketDataClient>,
    limiter: AdmissionLimiter,
    cache: Option<HistoryCache>,
    mode: CacheMode,
}

impl RequestGovernor {
    pub fn new(
        inner: Arc<dyn MarketDataClient>,
        limiter: AdmissionLimiter,
        cache: Option<HistoryCache>,
        mode: CacheMode,
    ) -> Self {
        Self {
            inner,
            limiter,
            cache,
            mode,
        }
    }

    pub fn limiter(&self) -> &AdmissionLimiter {
        &self.limiter
    }

    pub fn cache(&self) -> Option<&HistoryCache> {
        self.cache.as_ref()
    }

    async fn cached(&self, req: &HistoryRequest) -> Option<RawSeries> {
        let cache = self.cache.clone().filter(|_| self.mode.reads())?;
        let request = req.clone();
        let lookup = tokio::task::spawn_blocking(move || cache.get(&request)).await;

        match lookup {
            Ok(Ok(hit)) => hit,
            Ok(Err(error)) => {
                tracing::warn!(key = %req.cache_key(), %error, "history cache read failed");
                None
            }
            Err(error) => {
                tracing::warn!(key = %req.cache_key(), %error, "history cache read task failed");
                None
            }
        }
    }

    async fn store(&self, req: &HistoryRequest, table: &RawSeries) {
        let Some(cache) = self.cache.clone().filter(|_| self.mode.writes()) else {
            return;
        };
        // Empty answers are not cached: they would short-circuit the fallback
        // request on every later lookup.
        if table.is_empty() {
            return;
        }

        let request = req.clone();
        let table = table.clone();
        let write = tokio::task::spawn_blocking(move || cache.put(&request, &table)).await;

        match write {
            Ok(Ok(())) => {}
            Ok(Err(error)) => {
                tracing::warn!(key = %req.cache_key(), %error, "history cache write failed");
            }
            Err(error) => {
                tracing::warn!(key = %req.cache_key(), %error, "history cache write task failed");
            }
        }
    }
}

impl MarketDataClient for RequestGovernor {
    fn history<'a>(
        &'a self,
        req: HistoryRequest,
    ) -> Pin<Box<dyn Future<Output = Result<RawSeries, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            if let Some(hit) = self.cached(&req).await {
                tracing::debug!(key = %req.cache_key(), rows = hit.len(), "history cache hit");
                return Ok(hit);
            }

            self.limiter.admit().await;
            let table = self.inner.history(req.clone()).await?;
            self.store(&req, &table).await;

            tracing::debug!(key = %req.cache_key(), rows = table.len(), "history fetched upstream");
            Ok(table)
        })
    }
}
