//! Dashboard settings resolved from `TICKVIEW_*` environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::CacheMode;
use crate::fetcher::FetchPolicy;
use crate::{LookbackWindow, ValidationError};

const DEFAULT_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_RATE_LIMIT: u32 = 2;
const DEFAULT_RATE_WINDOW_SECS: u64 = 5;

/// Everything needed to build a [`crate::DashboardService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    /// Data root; the cache lives under `<home>/cache/`.
    pub home: PathBuf,
    pub window: LookbackWindow,
    pub explicit_fallback: bool,
    /// Serve deterministic synthetic history instead of calling the provider.
    pub offline: bool,
    pub request_timeout_ms: u64,
    /// Wrap the provider in the rate limiter and persistent cache.
    pub governor: bool,
    pub rate_limit: u32,
    pub rate_window: Duration,
    pub cache_mode: CacheMode,
    pub cache_ttl: Option<Duration>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self::with_home(resolve_tickview_home(|key| env::var(key).ok()))
    }
}

impl DashboardConfig {
    /// Default settings rooted at `home`.
    pub fn with_home(home: impl Into<PathBuf>) -> Self {
        Self {
            home: home.into(),
            window: LookbackWindow::default(),
            explicit_fallback: true,
            offline: false,
            request_timeout_ms: DEFAULT_TIMEOUT_MS,
            governor: true,
            rate_limit: DEFAULT_RATE_LIMIT,
            rate_window: Duration::from_secs(DEFAULT_RATE_WINDOW_SECS),
            cache_mode: CacheMode::default(),
            cache_ttl: None,
        }
    }

    pub fn from_env() -> Result<Self, ValidationError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Resolves settings through `lookup`, falling back to defaults for unset
    /// or blank keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ValidationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Self::with_home(resolve_tickview_home(&read));

        if let Some(window) = read("TICKVIEW_WINDOW") {
            config.window = window.parse()?;
        }
        if let Some(value) = read("TICKVIEW_FALLBACK") {
            config.explicit_fallback = parse_flag("TICKVIEW_FALLBACK", &value)?;
        }
        if let Some(value) = read("TICKVIEW_OFFLINE") {
            config.offline = parse_flag("TICKVIEW_OFFLINE", &value)?;
        }
        if let Some(value) = read("TICKVIEW_TIMEOUT_MS") {
            config.request_timeout_ms = parse_number("TICKVIEW_TIMEOUT_MS", &value)?;
        }
        if let Some(value) = read("TICKVIEW_GOVERNOR") {
            config.governor = parse_flag("TICKVIEW_GOVERNOR", &value)?;
        }
        if let Some(value) = read("TICKVIEW_RATE_LIMIT") {
            config.rate_limit = parse_number("TICKVIEW_RATE_LIMIT", &value)?;
        }
        if let Some(value) = read("TICKVIEW_RATE_WINDOW_SECS") {
            config.rate_window =
                Duration::from_secs(parse_number("TICKVIEW_RATE_WINDOW_SECS", &value)?);
        }
        if let Some(mode) = read("TICKVIEW_CACHE_MODE") {
            config.cache_mode = mode.parse()?;
        }
        if let Some(value) = read("TICKVIEW_CACHE_TTL_SECS") {
            config.cache_ttl = Some(Duration::from_secs(parse_number(
                "TICKVIEW_CACHE_TTL_SECS",
                &value,
            )?));
        }

        Ok(config)
    }

    /// Cache file for this run. Offline runs get their own file so synthetic
    /// history never answers a provider request.
    pub fn cache_path(&self) -> PathBuf {
        let file = if self.offline {
            "offline.duckdb"
        } else {
            "history.duckdb"
        };
        self.home.join("cache").join(file)
    }

    pub fn fetch_policy(&self) -> FetchPolicy {
        FetchPolicy {
            window: self.window,
            explicit_fallback: self.explicit_fallback,
        }
    }
}

fn resolve_tickview_home<F>(lookup: F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = lookup("TICKVIEW_HOME").filter(|path| !path.is_empty()) {
        return PathBuf::from(path);
    }

    match lookup("HOME").filter(|home| !home.is_empty()) {
        Some(home) => PathBuf::from(home).join(".tickview"),
        None => PathBuf::from(".tickview"),
    }
}

fn parse_flag(key: &'static str, value: &str) -> Result<bool, ValidationError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ValidationError::InvalidSetting {
            key,
            value: value.to_owned(),
        }),
    }
}

fn parse_number<T: FromStr>(key: &'static str, value: &str) -> Result<T, ValidationError> {
    value
        .trim()
        .parse()
        .map_err(|_| ValidationError::InvalidSetting {
            key,
            value: value.to_owned(),
        })
}
