use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use governor::clock::DefaultClock;
use governor::state::direct::NotKeyed;
use governor::state::InMemoryState;
use governor::{Quota, RateLimiter};

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Fixed-rate admission limiter for outbound provider calls.
///
/// Allows at most `quota_limit` calls in any `quota_window`; callers beyond the
/// budget wait for a slot instead of being rejected. Clones share one budget.
///
/// A full burst is admitted at once, after which one slot frees per window.
#[derive(Clone)]
pub struct AdmissionLimiter {
    limiter: Arc<DirectRateLimiter>,
    admitted: Arc<AtomicU64>,
    quota_window: Duration,
    quota_limit: u32,
}

impl AdmissionLimiter {
    pub fn new(quota_window: Duration, quota_limit: u32) -> Self {
        Self {
            limiter: Arc::new(RateLimiter::direct(quota_from_window(
                quota_window,
                quota_limit,
            ))),
            admitted: Arc::new(AtomicU64::new(0)),
            quota_window,
            quota_limit: quota_limit.max(1),
        }
    }

    /// Waits until the rate budget admits one call.
    pub async fn admit(&self) {
        if self.limiter.check().is_err() {
            tracing::debug!(
                limit = self.quota_limit,
                window_ms = self.quota_window.as_millis() as u64,
                "admission limiter saturated; waiting for a slot"
            );
            self.limiter.until_ready().await;
        }
        self.admitted.fetch_add(1, Ordering::Relaxed);
    }

    /// Non-blocking admission attempt.
    pub fn try_admit(&self) -> bool {
        let admitted = self.limiter.check().is_ok();
        if admitted {
            self.admitted.fetch_add(1, Ordering::Relaxed);
        }
        admitted
    }

    /// Total calls admitted since construction.
    pub fn admitted(&self) -> u64 {
        self.admitted.load(Ordering::Relaxed)
    }

    pub fn quota_limit(&self) -> u32 {
        self.quota_limit
    }

    pub fn quota_window(&self) -> Duration {
        self.quota_window
    }
}

// Replenishing one cell per whole window keeps any window-long interval at or
// under `burst` admissions; a per-cell period of window/burst would allow
// nearly twice that across a window boundary.
fn quota_from_window(quota_window: Duration, quota_limit: u32) -> Quota {
    let burst = NonZeroU32::new(quota_limit.max(1)).unwrap_or(NonZeroU32::MIN);
    let period = quota_window.max(Duration::from_millis(1));

    Quota::with_period(period)
        .unwrap_or_else(|| Quota::per_second(burst))
        .allow_burst(burst)
}
