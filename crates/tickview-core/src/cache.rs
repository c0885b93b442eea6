//! Persistent history cache backed by a DuckDB file.
//!
//! Entries are keyed by `(ticker, range descriptor)` and hold the serialized
//! provider table. Refetches overwrite in place; there is no other update path.
//!
//! Every open starts a new generation. Without a TTL an entry is only valid in
//! the generation that wrote it, so a restart always refetches.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use duckdb::{params, Connection};
use thiserror::Error;
use uuid::Uuid;

use crate::data_source::HistoryRequest;
use crate::{RawSeries, ValidationError};

/// Defines how the request governor uses the cache for a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheMode {
    /// Read from the cache if a fresh entry is present; otherwise fetch from the
    /// network and write the response to the cache. (Default)
    #[default]
    Use,
    /// Always fetch from the network, bypassing any cached entry,
    /// and write the new response to the cache.
    Refresh,
    /// Always fetch from the network and do not read from or write to the cache.
    Bypass,
}

impl CacheMode {
    pub const fn reads(self) -> bool {
        matches!(self, Self::Use)
    }

    pub const fn writes(self) -> bool {
        matches!(self, Self::Use | Self::Refresh)
    }
}

impl FromStr for CacheMode {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "use" => Ok(Self::Use),
            "refresh" => Ok(Self::Refresh),
            "bypass" => Ok(Self::Bypass),
            other => Err(ValidationError::InvalidCacheMode {
                value: other.to_owned(),
            }),
        }
    }
}

/// Errors raised by the history cache.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error(transparent)]
    DuckDb(#[from] duckdb::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("cache payload error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("cache connection lock poisoned")]
    Poisoned,
}

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS history_cache (
    cache_key VARCHAR PRIMARY KEY,
    ticker VARCHAR NOT NULL,
    range_descriptor VARCHAR NOT NULL,
    payload VARCHAR NOT NULL,
    fetched_at_ms BIGINT NOT NULL,
    generation VARCHAR NOT NULL
);
";

/// Thread-safe handle to the on-disk history cache.
#[derive(Clone)]
pub struct HistoryCache {
    connection: Arc<Mutex<Connection>>,
    path: PathBuf,
    ttl: Option<Duration>,
    generation: String,
}

impl HistoryCache {
    /// Opens (creating if needed) the cache file at `path`.
    ///
    /// `ttl` of `None` keeps entries valid until the handle's process opens the
    /// file again.
    pub fn open(path: impl Into<PathBuf>, ttl: Option<Duration>) -> Result<Self, CacheError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let connection = Connection::open(&path)?;
        connection.execute_batch("PRAGMA disable_progress_bar;")?;
        connection.execute_batch(SCHEMA)?;

        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
            path,
            ttl,
            generation: Uuid::new_v4().to_string(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    /// Returns the cached table for `request` if present and not expired.
    pub fn get(&self, request: &HistoryRequest) -> Result<Option<RawSeries>, CacheError> {
        let connection = self.connection.lock().map_err(|_| CacheError::Poisoned)?;
        let mut statement = connection
            .prepare("SELECT payload, fetched_at_ms, generation FROM history_cache WHERE cache_key = ?")?;
        let mut rows = statement.query(params![request.cache_key()])?;

        let Some(row) = rows.next()? else {
            return Ok(None);
        };
        let payload: String = row.get(0)?;
        let fetched_at_ms: i64 = row.get(1)?;
        let generation: String = row.get(2)?;

        if self.is_expired(fetched_at_ms, &generation) {
            return Ok(None);
        }

        Ok(Some(serde_json::from_str(&payload)?))
    }

    /// Writes `series` under the key of `request`, replacing any previous entry.
    pub fn put(&self, request: &HistoryRequest, series: &RawSeries) -> Result<(), CacheError> {
        let payload = serde_json::to_string(series)?;
        let connection = self.connection.lock().map_err(|_| CacheError::Poisoned)?;
        connection.execute(
            "INSERT OR REPLACE INTO history_cache VALUES (?, ?, ?, ?, ?, ?)",
            params![
                request.cache_key(),
                request.ticker.as_str(),
                request.range.descriptor(),
                payload,
                now_ms(),
                self.generation
            ],
        )?;
        Ok(())
    }

    /// Deletes entries that [`get`](Self::get) would no longer return.
    pub fn clear_expired(&self) -> Result<usize, CacheError> {
        let connection = self.connection.lock().map_err(|_| CacheError::Poisoned)?;
        let removed = match self.ttl {
            Some(ttl) => connection.execute(
                "DELETE FROM history_cache WHERE fetched_at_ms < ?",
                params![now_ms().saturating_sub(duration_ms(ttl))],
            )?,
            None => connection.execute(
                "DELETE FROM history_cache WHERE generation <> ?",
                params![self.generation],
            )?,
        };
        Ok(removed)
    }

    /// Number of stored entries, including expired ones.
    pub fn len(&self) -> Result<usize, CacheError> {
        let connection = self.connection.lock().map_err(|_| CacheError::Poisoned)?;
        let count: i64 =
            connection.query_row("SELECT COUNT(*) FROM history_cache", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    pub fn is_empty(&self) -> Result<bool, CacheError> {
        Ok(self.len()? == 0)
    }

    fn is_expired(&self, fetched_at_ms: i64, generation: &str) -> bool {
        match self.ttl {
            Some(ttl) => now_ms().saturating_sub(fetched_at_ms) > duration_ms(ttl),
            None => generation != self.generation,
        }
    }
}

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(duration_ms)
        .unwrap_or(0)
}

fn duration_ms(duration: Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}
