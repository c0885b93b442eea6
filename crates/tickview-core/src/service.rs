//! One-time construction of the render pipeline from [`DashboardConfig`].

use std::sync::Arc;

use crate::adapters::YahooAdapter;
use crate::cache::{CacheMode, HistoryCache};
use crate::config::DashboardConfig;
use crate::data_source::MarketDataClient;
use crate::fetcher::HistoryFetcher;
use crate::http_client::{HttpClient, NoopHttpClient, ReqwestHttpClient};
use crate::render::{RenderController, RenderResult};
use crate::request_governor::RequestGovernor;
use crate::throttling::AdmissionLimiter;
use crate::CoreError;

/// Shared entry point for every UI session.
///
/// Holds the only provider client, limiter, and cache handle in the process;
/// clone it freely.
#[derive(Clone)]
pub struct DashboardService {
    controller: RenderController,
    governor: Option<RequestGovernor>,
    config: Arc<DashboardConfig>,
}

impl DashboardService {
    pub fn from_config(config: DashboardConfig) -> Result<Self, CoreError> {
        let http_client: Arc<dyn HttpClient> = if config.offline {
            Arc::new(NoopHttpClient)
        } else {
            Arc::new(ReqwestHttpClient::new())
        };
        let adapter = YahooAdapter::with_http_client(http_client)
            .with_timeout_ms(config.request_timeout_ms);

        let governor = if config.governor {
            let limiter = AdmissionLimiter::new(config.rate_window, config.rate_limit);
            let cache = match config.cache_mode {
                CacheMode::Bypass => None,
                CacheMode::Use | CacheMode::Refresh => {
                    let cache = HistoryCache::open(config.cache_path(), config.cache_ttl)?;
                    let removed = cache.clear_expired()?;
                    tracing::info!(
                        path = %cache.path().display(),
                        removed,
                        "history cache opened"
                    );
                    Some(cache)
                }
            };
            Some(RequestGovernor::new(
                Arc::new(adapter.clone()),
                limiter,
                cache,
                config.cache_mode,
            ))
        } else {
            None
        };

        let client: Arc<dyn MarketDataClient> = match &governor {
            Some(governor) => Arc::new(governor.clone()),
            None => Arc::new(adapter),
        };

        tracing::info!(
            window = %config.window,
            offline = config.offline,
            governor = config.governor,
            "dashboard service ready"
        );

        Ok(Self::with_client(client, config, governor))
    }

    /// Builds the pipeline around an already-assembled client.
    pub fn with_client(
        client: Arc<dyn MarketDataClient>,
        config: DashboardConfig,
        governor: Option<RequestGovernor>,
    ) -> Self {
        let fetcher = HistoryFetcher::new(client, config.fetch_policy());
        Self {
            controller: RenderController::new(fetcher),
            governor,
            config: Arc::new(config),
        }
    }

    pub async fn render(&self, input: &str) -> RenderResult {
        self.controller.render(input).await
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn governor(&self) -> Option<&RequestGovernor> {
        self.governor.as_ref()
    }
}
