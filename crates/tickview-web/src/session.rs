//! Per-session ordering of render triggers.
//!
//! Every browser tab sends a session id and a sequence number that grows with each
//! keystroke. The newest trigger of a session wins: older triggers are skipped if
//! they have not started and discarded if they finish after a newer one arrived.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tokio::sync::Mutex as AsyncMutex;

const MAX_IDLE_SESSIONS: usize = 1024;
const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

#[derive(Debug)]
struct SessionSlot {
    latest: AtomicU64,
    running: AsyncMutex<()>,
    last_seen: Mutex<Instant>,
}

impl SessionSlot {
    fn new() -> Self {
        Self {
            latest: AtomicU64::new(0),
            running: AsyncMutex::new(()),
            last_seen: Mutex::new(Instant::now()),
        }
    }

    fn observe(&self, seq: u64) {
        self.latest.fetch_max(seq, Ordering::SeqCst);
        *self
            .last_seen
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Instant::now();
    }

    fn idle_for(&self, now: Instant) -> Duration {
        let last_seen = *self
            .last_seen
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        now.saturating_duration_since(last_seen)
    }

    fn is_current(&self, seq: u64) -> bool {
        self.latest.load(Ordering::SeqCst) <= seq
    }
}

/// Outcome of one gated render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gated<T> {
    Current(T),
    Superseded,
}

/// Serializes renders per session and drops stale ones.
///
/// Past 1024 tracked sessions, slots with no render in flight that have been
/// quiet for the idle timeout (30 minutes by default) are forgotten along with
/// their sequence numbers.
#[derive(Debug)]
pub struct SessionGate {
    sessions: Mutex<HashMap<String, Arc<SessionSlot>>>,
    idle_timeout: Duration,
}

impl Default for SessionGate {
    fn default() -> Self {
        Self::with_idle_timeout(DEFAULT_IDLE_TIMEOUT)
    }
}

impl SessionGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_idle_timeout(idle_timeout: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            idle_timeout,
        }
    }

    /// Runs `work` for trigger `seq` of `session` unless a newer trigger
    /// supersedes it before it starts or before it finishes.
    pub async fn run<F, T>(&self, session: &str, seq: u64, work: F) -> Gated<T>
    where
        F: Future<Output = T>,
    {
        let slot = self.slot(session);
        slot.observe(seq);

        let _running = slot.running.lock().await;
        if !slot.is_current(seq) {
            tracing::debug!(session, seq, "render skipped; newer trigger pending");
            return Gated::Superseded;
        }

        let output = work.await;
        if !slot.is_current(seq) {
            tracing::debug!(session, seq, "render discarded; newer trigger arrived");
            return Gated::Superseded;
        }
        Gated::Current(output)
    }

    /// Number of tracked sessions.
    pub fn len(&self) -> usize {
        self.lock_sessions().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, session: &str) -> Arc<SessionSlot> {
        let mut sessions = self.lock_sessions();
        if sessions.len() >= MAX_IDLE_SESSIONS && !sessions.contains_key(session) {
            let now = Instant::now();
            // Slots only referenced by the map have no render in flight.
            sessions.retain(|_, slot| {
                Arc::strong_count(slot) > 1 || slot.idle_for(now) < self.idle_timeout
            });
        }
        sessions
            .entry(session.to_owned())
            .or_insert_with(|| Arc::new(SessionSlot::new()))
            .clone()
    }

    fn lock_sessions(&self) -> std::sync::MutexGuard<'_, HashMap<String, Arc<SessionSlot>>> {
        self.sessions
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
