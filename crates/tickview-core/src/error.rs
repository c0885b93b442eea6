use thiserror::Error;

use crate::cache::CacheError;

/// Validation errors for user input and configuration values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("ticker cannot be empty")]
    EmptyTicker,

    #[error("invalid lookback window '{value}', expected forms like 90d, 3mo, 1y")]
    InvalidWindow { value: String },
    #[error("lookback window must be greater than zero")]
    ZeroWindow,

    #[error("invalid cache mode '{value}', expected one of use, refresh, bypass")]
    InvalidCacheMode { value: String },

    #[error("invalid value '{value}' for {key}")]
    InvalidSetting { key: &'static str, value: String },

    #[error("currency must be a 3-letter uppercase ISO code: '{value}'")]
    InvalidCurrency { value: String },
}

/// Top-level error type for building the dashboard service.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Cache(#[from] CacheError),
}
